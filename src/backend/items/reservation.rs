/**
 * Reservation Workflow
 *
 * Per item: available -> reserved(by = U) -> available.
 *
 * Both transitions are single conditional updates in the store, so two
 * concurrent reservers can never both win; the loser sees Conflict. The
 * pre-checks only pick the right error for the common, uncontended case.
 */

use uuid::Uuid;

use super::service::ItemService;
use crate::backend::error::BackendError;
use crate::shared::wishlist::WishItem;

impl ItemService {
    /// Reserve (`reserve = true`) or release an item on behalf of `caller`
    ///
    /// # Errors
    ///
    /// * `NotFound` - item or its wishlist missing
    /// * `PermissionDenied` - caller cannot read the wishlist, is the item's
    ///   creator (reserve), or is not the holder (release)
    /// * `Conflict` - item already reserved, including a lost race
    pub async fn set_reservation(
        &self,
        item_id: Uuid,
        caller: Uuid,
        reserve: bool,
    ) -> Result<WishItem, BackendError> {
        let (item, wishlist) = self.load_with_parent(item_id).await?;
        Self::require_read(&wishlist, caller)?;

        if reserve {
            if item.creator_id == caller {
                return Err(BackendError::permission_denied(
                    "You cannot reserve an item you added",
                ));
            }
            if item.is_reserved {
                return Err(BackendError::conflict("Item is already reserved"));
            }
            if !self.store.try_reserve(item_id, caller).await? {
                tracing::info!("Reservation race lost on item {} by {}", item_id, caller);
                return Err(BackendError::conflict("Item is already reserved"));
            }
            tracing::info!("Item {} reserved by {}", item_id, caller);
        } else {
            if !item.is_reserved_by(caller) {
                return Err(BackendError::permission_denied(
                    "Only the user holding the reservation can release it",
                ));
            }
            if !self.store.try_release(item_id, caller).await? {
                return Err(BackendError::permission_denied(
                    "Only the user holding the reservation can release it",
                ));
            }
            tracing::info!("Item {} released by {}", item_id, caller);
        }

        self.store
            .get_item(item_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Item not found"))
    }
}
