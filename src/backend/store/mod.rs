//! Entity Store
//!
//! Persistence seam for every entity the backend manages. Services hold an
//! `Arc<dyn EntityStore>` and never talk to the database directly.
//!
//! # Implementations
//!
//! - `PgStore` - PostgreSQL via sqlx, migrations in `migrations/`
//! - `MemoryStore` - tokio `RwLock` maps, used by tests and database-less runs
//!
//! # Atomicity
//!
//! Single-document updates are atomic. The conditional operations
//! (`try_reserve`, `try_release`, `accept_share`, `set_friend_request_status`)
//! return `false` when their precondition no longer holds, which lets callers
//! detect a lost race without a read-then-write window.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::friends::{FriendRequest, FriendRequestStatus};
use crate::shared::story::{Story, StoryView};
use crate::shared::wishlist::{ShareStatus, SharedWith, WishItem, Wishlist};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by an entity store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A row could not be mapped back into a domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Duplicate(db.constraint().unwrap_or("unique key").to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    // Users

    /// Fails with `StoreError::Duplicate` when the username or email is taken
    async fn create_user(&self, user: &User) -> StoreResult<()>;

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    // Friend requests

    async fn create_friend_request(&self, request: &FriendRequest) -> StoreResult<()>;

    async fn get_friend_request(&self, id: Uuid) -> StoreResult<Option<FriendRequest>>;

    /// Pending requests addressed to `user_id`, newest first
    async fn pending_friend_requests_for(&self, user_id: Uuid) -> StoreResult<Vec<FriendRequest>>;

    /// Whether a pending request exists between `a` and `b` in either direction
    async fn pending_request_between(&self, a: Uuid, b: Uuid) -> StoreResult<bool>;

    /// Move a pending request addressed to `to_user_id` into `status`
    async fn set_friend_request_status(
        &self,
        id: Uuid,
        to_user_id: Uuid,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Users connected to `user_id` by an accepted request
    async fn friend_ids(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // Wishlists

    async fn insert_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()>;

    /// Load a wishlist with its sharing entries and item ids
    async fn get_wishlist(&self, id: Uuid) -> StoreResult<Option<Wishlist>>;

    async fn wishlists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<Wishlist>>;

    /// Wishlists with a `status` entry for `user_id`, most recently shared first
    async fn wishlists_shared_with(
        &self,
        user_id: Uuid,
        status: ShareStatus,
    ) -> StoreResult<Vec<Wishlist>>;

    /// Persist the scalar fields of a wishlist
    async fn update_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()>;

    /// Delete a wishlist and its sharing entries
    async fn delete_wishlist(&self, id: Uuid) -> StoreResult<bool>;

    // Sharing

    /// Insert or replace the entry for `(wishlist_id, entry.user_id)`
    ///
    /// An entry that is already accepted stays accepted and keeps its
    /// `shared_at`; only its permission changes. Returns the stored entry.
    async fn upsert_share(&self, wishlist_id: Uuid, entry: &SharedWith) -> StoreResult<SharedWith>;

    /// Transition a pending entry to accepted
    async fn accept_share(&self, wishlist_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Remove an entry; with `only_pending` an accepted entry is left alone
    async fn remove_share(
        &self,
        wishlist_id: Uuid,
        user_id: Uuid,
        only_pending: bool,
    ) -> StoreResult<bool>;

    // Items

    async fn insert_item(&self, item: &WishItem) -> StoreResult<()>;

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<WishItem>>;

    async fn items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<Vec<WishItem>>;

    /// Persist the editable fields of an item; reservation state is untouched
    async fn update_item(&self, item: &WishItem) -> StoreResult<()>;

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool>;

    async fn delete_items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<u64>;

    /// Reserve for `user_id` only if the item is currently unreserved
    async fn try_reserve(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Clear the reservation only if `user_id` holds it
    async fn try_release(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    // Stories

    async fn insert_story(&self, story: &Story) -> StoreResult<()>;

    async fn get_story(&self, id: Uuid) -> StoreResult<Option<Story>>;

    /// Stories of `owner_id` still active at `now`, newest first
    async fn active_stories_for(&self, owner_id: Uuid, now: DateTime<Utc>) -> StoreResult<Vec<Story>>;

    /// Delete a story and its views
    async fn delete_story(&self, id: Uuid) -> StoreResult<bool>;

    /// Insert a view or refresh its timestamp
    async fn upsert_story_view(&self, view: &StoryView) -> StoreResult<()>;

    async fn has_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> StoreResult<bool>;

    /// The subset of `story_ids` that `viewer_id` has seen
    async fn viewed_story_ids(&self, viewer_id: Uuid, story_ids: &[Uuid]) -> StoreResult<HashSet<Uuid>>;

    async fn story_views(&self, story_id: Uuid) -> StoreResult<Vec<StoryView>>;

    /// Delete stories expired at `now`; returns the number removed
    async fn delete_expired_stories(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
