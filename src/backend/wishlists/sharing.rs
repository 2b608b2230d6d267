/**
 * Sharing Workflow
 *
 * States per (wishlist, user): absent -> pending -> accepted, with decline
 * taking pending back to absent and the owner able to remove any entry.
 *
 * Sharing is an upsert on the (wishlist, user) pair, so repeated invites
 * never produce duplicate entries. Re-sharing with an accepted user changes
 * their permission without sending them back to pending.
 */

use uuid::Uuid;

use super::service::WishlistService;
use crate::backend::auth::users::{normalize_email, User};
use crate::backend::error::BackendError;
use crate::backend::notify::{dispatch, Recipient, TemplateKind};
use crate::shared::access::is_owner;
use crate::shared::wishlist::{Invitation, ShareStatus, ShareWishlistRequest, SharedWith};

impl WishlistService {
    async fn resolve_target(&self, request: &ShareWishlistRequest) -> Result<User, BackendError> {
        let target = match (request.user_id, &request.email) {
            (Some(user_id), _) => self.store.get_user_by_id(user_id).await?,
            (None, Some(email)) => self.store.get_user_by_email(&normalize_email(email)).await?,
            (None, None) => {
                return Err(BackendError::invalid_input(
                    "Either user_id or email is required",
                ))
            }
        };
        target.ok_or_else(|| BackendError::not_found("Target user not found"))
    }

    /// Invite a user to a wishlist, or change an existing share's permission
    pub async fn share(
        &self,
        wishlist_id: Uuid,
        caller: Uuid,
        request: ShareWishlistRequest,
    ) -> Result<SharedWith, BackendError> {
        let wishlist = self.load(wishlist_id).await?;
        if !is_owner(&wishlist, caller) {
            return Err(BackendError::permission_denied(
                "Only the owner can share a wishlist",
            ));
        }

        let target = self.resolve_target(&request).await?;
        if target.id == wishlist.owner_id {
            return Err(BackendError::invalid_input(
                "Cannot share a wishlist with its owner",
            ));
        }

        // The store keeps an accepted entry accepted, even one accepted
        // after `wishlist` was read
        let entry = self
            .store
            .upsert_share(wishlist_id, &SharedWith::pending(target.id, request.permission))
            .await?;
        tracing::info!(
            "Wishlist {} shared with {} ({}, {})",
            wishlist_id,
            target.id,
            entry.permission.as_str(),
            entry.status.as_str()
        );

        if entry.is_pending() {
            let from = self
                .store
                .get_user_by_id(caller)
                .await?
                .map(|u| u.username)
                .unwrap_or_default();
            dispatch(
                self.notifier.clone(),
                Recipient {
                    user_id: target.id,
                    username: target.username,
                    email: target.email,
                },
                TemplateKind::WishlistShared,
                serde_json::json!({
                    "from": from,
                    "title": wishlist.title,
                    "permission": entry.permission.as_str(),
                    "wishlist_id": wishlist_id,
                }),
            );
        }

        Ok(entry)
    }

    /// Accept or decline the caller's pending invitation
    pub async fn respond_to_invitation(
        &self,
        wishlist_id: Uuid,
        caller: Uuid,
        accept: bool,
    ) -> Result<(), BackendError> {
        self.load(wishlist_id).await?;

        let changed = if accept {
            self.store.accept_share(wishlist_id, caller).await?
        } else {
            self.store.remove_share(wishlist_id, caller, true).await?
        };
        if !changed {
            return Err(BackendError::not_found("No pending invitation for this wishlist"));
        }

        tracing::info!(
            "Invitation to wishlist {} {} by {}",
            wishlist_id,
            if accept { "accepted" } else { "declined" },
            caller
        );
        Ok(())
    }

    /// Owner removes a user's share, pending or accepted
    pub async fn remove_sharing(
        &self,
        wishlist_id: Uuid,
        caller: Uuid,
        target: Uuid,
    ) -> Result<(), BackendError> {
        let wishlist = self.load(wishlist_id).await?;
        if !is_owner(&wishlist, caller) {
            return Err(BackendError::permission_denied(
                "Only the owner can remove sharing",
            ));
        }
        if !self.store.remove_share(wishlist_id, target, false).await? {
            return Err(BackendError::not_found("User is not shared on this wishlist"));
        }
        tracing::info!("Removed {} from wishlist {}", target, wishlist_id);
        Ok(())
    }

    /// The caller's pending invitations, newest first
    pub async fn pending_invitations(&self, user_id: Uuid) -> Result<Vec<Invitation>, BackendError> {
        let wishlists = self
            .store
            .wishlists_shared_with(user_id, ShareStatus::Pending)
            .await?;
        let mut invitations: Vec<Invitation> = wishlists
            .into_iter()
            .filter_map(|w| {
                let entry = w.share_for(user_id)?.clone();
                Some(Invitation {
                    wishlist_id: w.id,
                    title: w.title,
                    owner_id: w.owner_id,
                    permission: entry.permission,
                    shared_at: entry.shared_at,
                })
            })
            .collect();
        invitations.sort_by(|a, b| b.shared_at.cmp(&a.shared_at));
        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::notify::LogNotifier;
    use crate::backend::store::{EntityStore, MemoryStore};
    use crate::shared::access::{can_read, can_write};
    use crate::shared::wishlist::{CreateWishlistRequest, Permission, UpdateWishlistRequest};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    async fn setup() -> (WishlistService, Arc<MemoryStore>, User, User) {
        let store = Arc::new(MemoryStore::new());
        let owner = User::new("owner".into(), "owner@example.com".into(), "x".into());
        let friend = User::new("friend".into(), "friend@example.com".into(), "x".into());
        store.create_user(&owner).await.unwrap();
        store.create_user(&friend).await.unwrap();
        let service = WishlistService::new(store.clone(), Arc::new(LogNotifier));
        (service, store, owner, friend)
    }

    fn share_to(user_id: Uuid, permission: Permission) -> ShareWishlistRequest {
        ShareWishlistRequest {
            user_id: Some(user_id),
            email: None,
            permission,
        }
    }

    async fn create(service: &WishlistService, owner: Uuid) -> Uuid {
        service
            .create(
                owner,
                CreateWishlistRequest {
                    title: "Birthday".into(),
                    description: None,
                    is_public: None,
                },
            )
            .await
            .unwrap()
            .wishlist
            .id
    }

    #[tokio::test]
    async fn test_pending_share_grants_nothing_until_accepted() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;

        service.share(id, owner.id, share_to(friend.id, Permission::Write)).await.unwrap();
        let wishlist = service.load(id).await.unwrap();
        assert!(!can_read(&wishlist, friend.id));

        service.respond_to_invitation(id, friend.id, true).await.unwrap();
        let wishlist = service.load(id).await.unwrap();
        assert!(can_write(&wishlist, friend.id));
    }

    #[tokio::test]
    async fn test_reshare_accepted_keeps_status() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;

        service.share(id, owner.id, share_to(friend.id, Permission::Read)).await.unwrap();
        service.respond_to_invitation(id, friend.id, true).await.unwrap();
        let entry = service
            .share(id, owner.id, share_to(friend.id, Permission::Admin))
            .await
            .unwrap();

        assert_eq!(entry.status, ShareStatus::Accepted);
        assert_eq!(entry.permission, Permission::Admin);
        assert_eq!(service.load(id).await.unwrap().shared_with.len(), 1);
    }

    #[tokio::test]
    async fn test_share_by_email() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;
        let request = ShareWishlistRequest {
            user_id: None,
            email: Some("FRIEND@example.com".into()),
            permission: Permission::Read,
        };
        let entry = service.share(id, owner.id, request).await.unwrap();
        assert_eq!(entry.user_id, friend.id);
    }

    #[tokio::test]
    async fn test_share_rules() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;

        assert_matches!(
            service.share(id, friend.id, share_to(owner.id, Permission::Read)).await,
            Err(BackendError::PermissionDenied { .. })
        );
        assert_matches!(
            service.share(id, owner.id, share_to(owner.id, Permission::Read)).await,
            Err(BackendError::InvalidInput { .. })
        );
        assert_matches!(
            service.share(id, owner.id, share_to(Uuid::new_v4(), Permission::Read)).await,
            Err(BackendError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_decline_and_missing_invitation() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;

        assert_matches!(
            service.respond_to_invitation(id, friend.id, true).await,
            Err(BackendError::NotFound { .. })
        );

        service.share(id, owner.id, share_to(friend.id, Permission::Read)).await.unwrap();
        assert_eq!(service.pending_invitations(friend.id).await.unwrap().len(), 1);
        service.respond_to_invitation(id, friend.id, false).await.unwrap();
        assert!(service.load(id).await.unwrap().shared_with.is_empty());
        assert!(service.pending_invitations(friend.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_sharing_revokes_access() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;
        service.share(id, owner.id, share_to(friend.id, Permission::Write)).await.unwrap();
        service.respond_to_invitation(id, friend.id, true).await.unwrap();

        service.remove_sharing(id, owner.id, friend.id).await.unwrap();
        assert_matches!(
            service.update(id, friend.id, UpdateWishlistRequest::default()).await,
            Err(BackendError::PermissionDenied { .. })
        );
        assert_matches!(
            service.remove_sharing(id, owner.id, friend.id).await,
            Err(BackendError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_non_owner_view_hides_shares() {
        let (service, _, owner, friend) = setup().await;
        let id = create(&service, owner.id).await;
        service.share(id, owner.id, share_to(friend.id, Permission::Read)).await.unwrap();
        service.respond_to_invitation(id, friend.id, true).await.unwrap();

        let as_friend = service.get(id, friend.id).await.unwrap();
        assert!(!as_friend.is_owner);
        assert!(!as_friend.can_write);
        assert!(as_friend.wishlist.shared_with.is_empty());

        let as_owner = service.get(id, owner.id).await.unwrap();
        assert_eq!(as_owner.wishlist.shared_with.len(), 1);
    }
}
