/**
 * Wishlist Service
 *
 * CRUD over wishlists. Every operation re-reads the wishlist and checks
 * access with the shared evaluator against that fresh state.
 */

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::notify::Notifier;
use crate::backend::store::EntityStore;
use crate::shared::access::{can_read, can_write, is_owner};
use crate::shared::wishlist::{
    CreateWishlistRequest, ShareStatus, UpdateWishlistRequest, Wishlist, WishlistResponse,
};

#[derive(Clone)]
pub struct WishlistService {
    pub(super) store: Arc<dyn EntityStore>,
    pub(super) notifier: Arc<dyn Notifier>,
}

impl WishlistService {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Load a wishlist or fail with NotFound
    pub async fn load(&self, id: Uuid) -> Result<Wishlist, BackendError> {
        self.store
            .get_wishlist(id)
            .await?
            .ok_or_else(|| BackendError::not_found("Wishlist not found"))
    }

    /// Shape a wishlist for `caller`; sharing entries are shown to the owner only
    pub fn view_for(mut wishlist: Wishlist, caller: Uuid) -> WishlistResponse {
        let owner = is_owner(&wishlist, caller);
        let writable = can_write(&wishlist, caller);
        if !owner {
            wishlist.shared_with.clear();
        }
        WishlistResponse {
            wishlist,
            is_owner: owner,
            can_write: writable,
        }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateWishlistRequest,
    ) -> Result<WishlistResponse, BackendError> {
        request.validate()?;
        let wishlist = Wishlist::new(
            owner_id,
            request.title.trim().to_string(),
            request.description.unwrap_or_default(),
            request.is_public.unwrap_or(false),
        );
        self.store.insert_wishlist(&wishlist).await?;
        tracing::info!("Wishlist {} created by {}", wishlist.id, owner_id);
        Ok(Self::view_for(wishlist, owner_id))
    }

    pub async fn get(&self, id: Uuid, caller: Uuid) -> Result<WishlistResponse, BackendError> {
        let wishlist = self.load(id).await?;
        if !can_read(&wishlist, caller) {
            return Err(BackendError::permission_denied(
                "You do not have access to this wishlist",
            ));
        }
        Ok(Self::view_for(wishlist, caller))
    }

    pub async fn list_mine(&self, owner_id: Uuid) -> Result<Vec<WishlistResponse>, BackendError> {
        let wishlists = self.store.wishlists_owned_by(owner_id).await?;
        Ok(wishlists
            .into_iter()
            .map(|w| Self::view_for(w, owner_id))
            .collect())
    }

    /// Wishlists where the caller holds an accepted share
    pub async fn list_shared_with(&self, user_id: Uuid) -> Result<Vec<WishlistResponse>, BackendError> {
        let wishlists = self
            .store
            .wishlists_shared_with(user_id, ShareStatus::Accepted)
            .await?;
        Ok(wishlists
            .into_iter()
            .map(|w| Self::view_for(w, user_id))
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller: Uuid,
        patch: UpdateWishlistRequest,
    ) -> Result<WishlistResponse, BackendError> {
        patch.validate()?;
        let mut wishlist = self.load(id).await?;
        if !can_write(&wishlist, caller) {
            return Err(BackendError::permission_denied(
                "You cannot modify this wishlist",
            ));
        }
        patch.apply_to(&mut wishlist);
        self.store.update_wishlist(&wishlist).await?;
        tracing::info!("Wishlist {} updated by {}", id, caller);
        Ok(Self::view_for(wishlist, caller))
    }

    /// Owner-only delete: items first, then the wishlist with its shares
    pub async fn delete(&self, id: Uuid, caller: Uuid) -> Result<(), BackendError> {
        let wishlist = self.load(id).await?;
        if !is_owner(&wishlist, caller) {
            return Err(BackendError::permission_denied(
                "Only the owner can delete a wishlist",
            ));
        }
        let removed_items = self.store.delete_items_for_wishlist(id).await?;
        self.store.delete_wishlist(id).await?;
        tracing::info!("Wishlist {} deleted with {} items", id, removed_items);
        Ok(())
    }
}
