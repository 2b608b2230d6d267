//! PostgreSQL entity store
//!
//! Hand-written queries with runtime binding, as in the rest of the backend.
//! Conditional updates report whether a row matched so the services can tell
//! a lost race from success.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::{EntityStore, StoreError, StoreResult};
use crate::backend::auth::users::User;
use crate::shared::friends::{FriendRequest, FriendRequestStatus};
use crate::shared::story::{Story, StoryMedia, StoryView};
use crate::shared::wishlist::{Permission, ShareStatus, SharedWith, WishItem, Wishlist};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const FRIEND_REQUEST_COLUMNS: &str =
    "id, from_user_id, to_user_id, from_username, status, created_at, responded_at";
const WISHLIST_COLUMNS: &str =
    "w.id, w.owner_id, w.title, w.description, w.is_public, w.is_favorite, w.created_at, w.updated_at";
const ITEM_COLUMNS: &str = "id, wishlist_id, creator_id, name, price_cents, currency, image_url, \
     is_favorite, is_reserved, reserved_by, created_at, updated_at";
const STORY_COLUMNS: &str = "id, owner_id, media, created_at, expires_at";

/// Entity store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and bring the schema up to date
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        tracing::info!("Database connection pool created successfully");

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations completed successfully");

        Ok(Self::new(pool))
    }

    async fn hydrate_wishlist(&self, mut wishlist: Wishlist) -> StoreResult<Wishlist> {
        let shares = sqlx::query(
            r#"
            SELECT user_id, permission, status, shared_at
            FROM wishlist_shares
            WHERE wishlist_id = $1
            ORDER BY shared_at
            "#,
        )
        .bind(wishlist.id)
        .fetch_all(&self.pool)
        .await?;
        wishlist.shared_with = shares
            .iter()
            .map(share_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let item_ids = sqlx::query(
            "SELECT id FROM wish_items WHERE wishlist_id = $1 ORDER BY created_at",
        )
        .bind(wishlist.id)
        .fetch_all(&self.pool)
        .await?;
        wishlist.item_ids = item_ids
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(wishlist)
    }

    async fn hydrate_all(&self, rows: Vec<PgRow>) -> StoreResult<Vec<Wishlist>> {
        let mut wishlists = Vec::with_capacity(rows.len());
        for row in &rows {
            let wishlist = wishlist_from_row(row)?;
            wishlists.push(self.hydrate_wishlist(wishlist).await?);
        }
        Ok(wishlists)
    }
}

fn friend_request_from_row(row: &PgRow) -> StoreResult<FriendRequest> {
    let status: String = row.try_get("status")?;
    Ok(FriendRequest {
        id: row.try_get("id")?,
        from_user_id: row.try_get("from_user_id")?,
        to_user_id: row.try_get("to_user_id")?,
        from_username: row.try_get("from_username")?,
        status: FriendRequestStatus::parse(&status)
            .ok_or_else(|| StoreError::Corrupt(format!("friend request status '{}'", status)))?,
        created_at: row.try_get("created_at")?,
        responded_at: row.try_get("responded_at")?,
    })
}

fn wishlist_from_row(row: &PgRow) -> StoreResult<Wishlist> {
    Ok(Wishlist {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        is_public: row.try_get("is_public")?,
        is_favorite: row.try_get("is_favorite")?,
        item_ids: Vec::new(),
        shared_with: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn share_from_row(row: &PgRow) -> StoreResult<SharedWith> {
    let permission: String = row.try_get("permission")?;
    let status: String = row.try_get("status")?;
    Ok(SharedWith {
        user_id: row.try_get("user_id")?,
        permission: Permission::parse(&permission)
            .ok_or_else(|| StoreError::Corrupt(format!("share permission '{}'", permission)))?,
        status: ShareStatus::parse(&status)
            .ok_or_else(|| StoreError::Corrupt(format!("share status '{}'", status)))?,
        shared_at: row.try_get("shared_at")?,
    })
}

fn item_from_row(row: &PgRow) -> StoreResult<WishItem> {
    Ok(WishItem {
        id: row.try_get("id")?,
        wishlist_id: row.try_get("wishlist_id")?,
        creator_id: row.try_get("creator_id")?,
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        currency: row.try_get("currency")?,
        image_url: row.try_get("image_url")?,
        is_favorite: row.try_get("is_favorite")?,
        is_reserved: row.try_get("is_reserved")?,
        reserved_by: row.try_get("reserved_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn story_from_row(row: &PgRow) -> StoreResult<Story> {
    let Json(media): Json<Vec<StoryMedia>> = row.try_get("media")?;
    Ok(Story {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        media,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_friend_request(&self, request: &FriendRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id, from_username, status, created_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(request.id)
        .bind(request.from_user_id)
        .bind(request.to_user_id)
        .bind(&request.from_username)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.responded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_friend_request(&self, id: Uuid) -> StoreResult<Option<FriendRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM friend_requests WHERE id = $1",
            FRIEND_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(friend_request_from_row).transpose()
    }

    async fn pending_friend_requests_for(&self, user_id: Uuid) -> StoreResult<Vec<FriendRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM friend_requests WHERE to_user_id = $1 AND status = 'pending' ORDER BY created_at DESC",
            FRIEND_REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(friend_request_from_row).collect()
    }

    async fn pending_request_between(&self, a: Uuid, b: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friend_requests
                WHERE status = 'pending'
                  AND ((from_user_id = $1 AND to_user_id = $2) OR (from_user_id = $2 AND to_user_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn set_friend_request_status(
        &self,
        id: Uuid,
        to_user_id: Uuid,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE friend_requests
            SET status = $1, responded_at = $2
            WHERE id = $3 AND to_user_id = $4 AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(at)
        .bind(id)
        .bind(to_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn friend_ids(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CASE WHEN from_user_id = $1 THEN to_user_id ELSE from_user_id END
            FROM friend_requests
            WHERE status = 'accepted' AND (from_user_id = $1 OR to_user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wishlists (id, owner_id, title, description, is_public, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(wishlist.id)
        .bind(wishlist.owner_id)
        .bind(&wishlist.title)
        .bind(&wishlist.description)
        .bind(wishlist.is_public)
        .bind(wishlist.is_favorite)
        .bind(wishlist.created_at)
        .bind(wishlist.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_wishlist(&self, id: Uuid) -> StoreResult<Option<Wishlist>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wishlists w WHERE w.id = $1",
            WISHLIST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(self.hydrate_wishlist(wishlist_from_row(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn wishlists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<Wishlist>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM wishlists w WHERE w.owner_id = $1 ORDER BY w.created_at DESC",
            WISHLIST_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_all(rows).await
    }

    async fn wishlists_shared_with(
        &self,
        user_id: Uuid,
        status: ShareStatus,
    ) -> StoreResult<Vec<Wishlist>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM wishlists w
            JOIN wishlist_shares s ON s.wishlist_id = w.id
            WHERE s.user_id = $1 AND s.status = $2
            ORDER BY s.shared_at DESC
            "#,
            WISHLIST_COLUMNS
        ))
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_all(rows).await
    }

    async fn update_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE wishlists
            SET title = $1, description = $2, is_public = $3, is_favorite = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&wishlist.title)
        .bind(&wishlist.description)
        .bind(wishlist.is_public)
        .bind(wishlist.is_favorite)
        .bind(wishlist.updated_at)
        .bind(wishlist.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_wishlist(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM wishlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn upsert_share(&self, wishlist_id: Uuid, entry: &SharedWith) -> StoreResult<SharedWith> {
        let row = sqlx::query(
            r#"
            INSERT INTO wishlist_shares (wishlist_id, user_id, permission, status, shared_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (wishlist_id, user_id)
            DO UPDATE SET
                permission = EXCLUDED.permission,
                status = CASE WHEN wishlist_shares.status = 'accepted'
                    THEN wishlist_shares.status ELSE EXCLUDED.status END,
                shared_at = CASE WHEN wishlist_shares.status = 'accepted'
                    THEN wishlist_shares.shared_at ELSE EXCLUDED.shared_at END
            RETURNING user_id, permission, status, shared_at
            "#,
        )
        .bind(wishlist_id)
        .bind(entry.user_id)
        .bind(entry.permission.as_str())
        .bind(entry.status.as_str())
        .bind(entry.shared_at)
        .fetch_one(&self.pool)
        .await?;
        share_from_row(&row)
    }

    async fn accept_share(&self, wishlist_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wishlist_shares
            SET status = 'accepted'
            WHERE wishlist_id = $1 AND user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(wishlist_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_share(
        &self,
        wishlist_id: Uuid,
        user_id: Uuid,
        only_pending: bool,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM wishlist_shares
            WHERE wishlist_id = $1 AND user_id = $2 AND (NOT $3 OR status = 'pending')
            "#,
        )
        .bind(wishlist_id)
        .bind(user_id)
        .bind(only_pending)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_item(&self, item: &WishItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wish_items (id, wishlist_id, creator_id, name, price_cents, currency, image_url,
                                    is_favorite, is_reserved, reserved_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(item.wishlist_id)
        .bind(item.creator_id)
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(&item.currency)
        .bind(&item.image_url)
        .bind(item.is_favorite)
        .bind(item.is_reserved)
        .bind(item.reserved_by)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<WishItem>> {
        let row = sqlx::query(&format!("SELECT {} FROM wish_items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<Vec<WishItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM wish_items WHERE wishlist_id = $1 ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(wishlist_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn update_item(&self, item: &WishItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE wish_items
            SET name = $1, price_cents = $2, currency = $3, image_url = $4, is_favorite = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(&item.currency)
        .bind(&item.image_url)
        .bind(item.is_favorite)
        .bind(item.updated_at)
        .bind(item.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM wish_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM wish_items WHERE wishlist_id = $1")
            .bind(wishlist_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn try_reserve(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wish_items
            SET is_reserved = TRUE, reserved_by = $1, updated_at = $2
            WHERE id = $3 AND is_reserved = FALSE
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(item_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn try_release(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wish_items
            SET is_reserved = FALSE, reserved_by = NULL, updated_at = $1
            WHERE id = $2 AND is_reserved = TRUE AND reserved_by = $3
            "#,
        )
        .bind(Utc::now())
        .bind(item_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_story(&self, story: &Story) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stories (id, owner_id, media, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(story.id)
        .bind(story.owner_id)
        .bind(Json(&story.media))
        .bind(story.created_at)
        .bind(story.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_story(&self, id: Uuid) -> StoreResult<Option<Story>> {
        let row = sqlx::query(&format!("SELECT {} FROM stories WHERE id = $1", STORY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(story_from_row).transpose()
    }

    async fn active_stories_for(&self, owner_id: Uuid, now: DateTime<Utc>) -> StoreResult<Vec<Story>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM stories WHERE owner_id = $1 AND expires_at > $2 ORDER BY created_at DESC",
            STORY_COLUMNS
        ))
        .bind(owner_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(story_from_row).collect()
    }

    async fn delete_story(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn upsert_story_view(&self, view: &StoryView) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO story_views (story_id, viewer_id, viewed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (story_id, viewer_id) DO UPDATE SET viewed_at = EXCLUDED.viewed_at
            "#,
        )
        .bind(view.story_id)
        .bind(view.viewer_id)
        .bind(view.viewed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM story_views WHERE story_id = $1 AND viewer_id = $2)",
        )
        .bind(story_id)
        .bind(viewer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn viewed_story_ids(&self, viewer_id: Uuid, story_ids: &[Uuid]) -> StoreResult<HashSet<Uuid>> {
        if story_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT story_id FROM story_views WHERE viewer_id = $1 AND story_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(story_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn story_views(&self, story_id: Uuid) -> StoreResult<Vec<StoryView>> {
        let rows = sqlx::query(
            "SELECT story_id, viewer_id, viewed_at FROM story_views WHERE story_id = $1 ORDER BY viewed_at DESC",
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> StoreResult<StoryView> {
                Ok(StoryView {
                    story_id: row.try_get("story_id")?,
                    viewer_id: row.try_get("viewer_id")?,
                    viewed_at: row.try_get("viewed_at")?,
                })
            })
            .collect()
    }

    async fn delete_expired_stories(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM stories WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
