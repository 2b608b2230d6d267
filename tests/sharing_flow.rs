//! Wishlist sharing workflow against the in-memory store

mod support;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use support::{create_user, test_app};
use wishhub::backend::error::BackendError;
use wishhub::shared::wishlist::{
    CreateWishlistRequest, Permission, ShareStatus, ShareWishlistRequest, UpdateWishlistRequest,
};

fn birthday() -> CreateWishlistRequest {
    CreateWishlistRequest {
        title: "Birthday".into(),
        description: Some("Things I'd like".into()),
        is_public: Some(false),
    }
}

fn share_with(user_id: uuid::Uuid, permission: Permission) -> ShareWishlistRequest {
    ShareWishlistRequest {
        user_id: Some(user_id),
        email: None,
        permission,
    }
}

#[tokio::test]
async fn test_create_then_get_by_owner() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;

    let created = app.state.wishlists.create(owner.id, birthday()).await.unwrap();
    let fetched = app
        .state
        .wishlists
        .get(created.wishlist.id, owner.id)
        .await
        .unwrap();

    assert!(fetched.is_owner);
    assert!(fetched.can_write);
    assert_eq!(fetched.wishlist.title, "Birthday");
    assert_eq!(fetched.wishlist.description, "Things I'd like");
    assert!(!fetched.wishlist.is_public);
}

#[tokio::test]
async fn test_shared_writer_can_edit_stranger_cannot() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;
    let x = create_user(&app.store, "xavier").await;
    let y = create_user(&app.store, "yolanda").await;
    let wishlists = &app.state.wishlists;

    let id = wishlists.create(owner.id, birthday()).await.unwrap().wishlist.id;
    wishlists.share(id, owner.id, share_with(x.id, Permission::Write)).await.unwrap();
    wishlists.respond_to_invitation(id, x.id, true).await.unwrap();

    let patch = UpdateWishlistRequest {
        title: Some("Birthday 2026".into()),
        ..Default::default()
    };
    let updated = wishlists.update(id, x.id, patch.clone()).await.unwrap();
    assert_eq!(updated.wishlist.title, "Birthday 2026");
    assert!(!updated.is_owner);

    assert_matches!(
        wishlists.update(id, y.id, patch).await,
        Err(BackendError::PermissionDenied { .. })
    );
}

#[tokio::test]
async fn test_sharing_twice_keeps_one_entry() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;
    let x = create_user(&app.store, "xavier").await;
    let wishlists = &app.state.wishlists;

    let id = wishlists.create(owner.id, birthday()).await.unwrap().wishlist.id;
    wishlists.share(id, owner.id, share_with(x.id, Permission::Read)).await.unwrap();
    let second = wishlists.share(id, owner.id, share_with(x.id, Permission::Write)).await.unwrap();

    assert_eq!(second.status, ShareStatus::Pending);
    let stored = wishlists.load(id).await.unwrap();
    assert_eq!(stored.shared_with.len(), 1);
    assert_eq!(stored.shared_with[0].permission, Permission::Write);
}

#[tokio::test]
async fn test_accepting_missing_invitation_is_not_found() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;
    let x = create_user(&app.store, "xavier").await;

    let id = app.state.wishlists.create(owner.id, birthday()).await.unwrap().wishlist.id;
    assert_matches!(
        app.state.wishlists.respond_to_invitation(id, x.id, true).await,
        Err(BackendError::NotFound { .. })
    );
}

#[tokio::test]
async fn test_read_share_is_listed_but_not_writable() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;
    let x = create_user(&app.store, "xavier").await;
    let wishlists = &app.state.wishlists;

    let id = wishlists.create(owner.id, birthday()).await.unwrap().wishlist.id;
    wishlists.share(id, owner.id, share_with(x.id, Permission::Read)).await.unwrap();

    assert!(wishlists.list_shared_with(x.id).await.unwrap().is_empty());
    let invitations = wishlists.pending_invitations(x.id).await.unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].title, "Birthday");

    wishlists.respond_to_invitation(id, x.id, true).await.unwrap();
    let shared = wishlists.list_shared_with(x.id).await.unwrap();
    assert_eq!(shared.len(), 1);
    assert!(!shared[0].can_write);
    assert_matches!(
        wishlists.update(id, x.id, UpdateWishlistRequest::default()).await,
        Err(BackendError::PermissionDenied { .. })
    );
}

#[tokio::test]
async fn test_delete_removes_items() {
    let app = test_app();
    let owner = create_user(&app.store, "owner").await;
    let id = app.state.wishlists.create(owner.id, birthday()).await.unwrap().wishlist.id;
    let item = app
        .state
        .items
        .create(
            id,
            owner.id,
            wishhub::shared::wishlist::CreateItemRequest {
                name: "Scarf".into(),
                price_cents: None,
                currency: None,
                image_url: None,
                is_favorite: None,
            },
        )
        .await
        .unwrap();

    app.state.wishlists.delete(id, owner.id).await.unwrap();

    assert_matches!(
        app.state.wishlists.get(id, owner.id).await,
        Err(BackendError::NotFound { .. })
    );
    assert_matches!(
        app.state.items.get(item.id, owner.id).await,
        Err(BackendError::NotFound { .. })
    );
}
