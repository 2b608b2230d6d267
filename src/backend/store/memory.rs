//! In-memory entity store
//!
//! All tables sit behind a single tokio `RwLock`, so every trait call is
//! atomic with respect to every other. Used by the integration tests and when
//! the server runs without `DATABASE_URL`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, StoreError, StoreResult};
use crate::backend::auth::users::User;
use crate::shared::friends::{FriendRequest, FriendRequestStatus};
use crate::shared::story::{Story, StoryView};
use crate::shared::wishlist::{ShareStatus, SharedWith, WishItem, Wishlist};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    friend_requests: HashMap<Uuid, FriendRequest>,
    /// `item_ids` is derived from `items` on read and left empty here
    wishlists: HashMap<Uuid, Wishlist>,
    items: HashMap<Uuid, WishItem>,
    stories: HashMap<Uuid, Story>,
    views: HashMap<(Uuid, Uuid), StoryView>,
}

impl Tables {
    fn items_of(&self, wishlist_id: Uuid) -> Vec<WishItem> {
        let mut items: Vec<WishItem> = self
            .items
            .values()
            .filter(|item| item.wishlist_id == wishlist_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.created_at, item.id));
        items
    }

    fn hydrated(&self, wishlist: &Wishlist) -> Wishlist {
        let mut wishlist = wishlist.clone();
        wishlist.item_ids = self.items_of(wishlist.id).iter().map(|item| item.id).collect();
        wishlist
    }
}

/// Entity store kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(taken) = tables
            .users
            .values()
            .find(|u| u.username == user.username || u.email == user.email)
        {
            let key = if taken.username == user.username { "username" } else { "email" };
            return Err(StoreError::Duplicate(key.to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_friend_request(&self, request: &FriendRequest) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .friend_requests
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn get_friend_request(&self, id: Uuid) -> StoreResult<Option<FriendRequest>> {
        Ok(self.tables.read().await.friend_requests.get(&id).cloned())
    }

    async fn pending_friend_requests_for(&self, user_id: Uuid) -> StoreResult<Vec<FriendRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<FriendRequest> = tables
            .friend_requests
            .values()
            .filter(|r| r.to_user_id == user_id && r.is_pending())
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn pending_request_between(&self, a: Uuid, b: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.friend_requests.values().any(|r| {
            r.is_pending()
                && ((r.from_user_id == a && r.to_user_id == b)
                    || (r.from_user_id == b && r.to_user_id == a))
        }))
    }

    async fn set_friend_request_status(
        &self,
        id: Uuid,
        to_user_id: Uuid,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.friend_requests.get_mut(&id) {
            Some(request) if request.to_user_id == to_user_id && request.is_pending() => {
                request.status = status;
                request.responded_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn friend_ids(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.read().await;
        let mut ids: Vec<Uuid> = tables
            .friend_requests
            .values()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .filter_map(|r| {
                if r.from_user_id == user_id {
                    Some(r.to_user_id)
                } else if r.to_user_id == user_id {
                    Some(r.from_user_id)
                } else {
                    None
                }
            })
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn insert_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()> {
        let mut stored = wishlist.clone();
        stored.item_ids.clear();
        self.tables.write().await.wishlists.insert(stored.id, stored);
        Ok(())
    }

    async fn get_wishlist(&self, id: Uuid) -> StoreResult<Option<Wishlist>> {
        let tables = self.tables.read().await;
        Ok(tables.wishlists.get(&id).map(|w| tables.hydrated(w)))
    }

    async fn wishlists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<Wishlist>> {
        let tables = self.tables.read().await;
        let mut wishlists: Vec<Wishlist> = tables
            .wishlists
            .values()
            .filter(|w| w.owner_id == owner_id)
            .map(|w| tables.hydrated(w))
            .collect();
        wishlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(wishlists)
    }

    async fn wishlists_shared_with(
        &self,
        user_id: Uuid,
        status: ShareStatus,
    ) -> StoreResult<Vec<Wishlist>> {
        let tables = self.tables.read().await;
        let mut wishlists: Vec<Wishlist> = tables
            .wishlists
            .values()
            .filter(|w| w.share_for(user_id).is_some_and(|s| s.status == status))
            .map(|w| tables.hydrated(w))
            .collect();
        let shared_at = |w: &Wishlist| w.share_for(user_id).map(|s| s.shared_at);
        wishlists.sort_by(|a, b| shared_at(b).cmp(&shared_at(a)));
        Ok(wishlists)
    }

    async fn update_wishlist(&self, wishlist: &Wishlist) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.wishlists.get_mut(&wishlist.id) {
            stored.title = wishlist.title.clone();
            stored.description = wishlist.description.clone();
            stored.is_public = wishlist.is_public;
            stored.is_favorite = wishlist.is_favorite;
            stored.updated_at = wishlist.updated_at;
        }
        Ok(())
    }

    async fn delete_wishlist(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.wishlists.remove(&id).is_some())
    }

    async fn upsert_share(&self, wishlist_id: Uuid, entry: &SharedWith) -> StoreResult<SharedWith> {
        let mut tables = self.tables.write().await;
        let Some(wishlist) = tables.wishlists.get_mut(&wishlist_id) else {
            return Ok(entry.clone());
        };
        match wishlist.shared_with.iter_mut().find(|s| s.user_id == entry.user_id) {
            Some(existing) if existing.is_accepted() => {
                existing.permission = entry.permission;
                Ok(existing.clone())
            }
            Some(existing) => {
                *existing = entry.clone();
                Ok(existing.clone())
            }
            None => {
                wishlist.shared_with.push(entry.clone());
                Ok(entry.clone())
            }
        }
    }

    async fn accept_share(&self, wishlist_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .wishlists
            .get_mut(&wishlist_id)
            .and_then(|w| w.shared_with.iter_mut().find(|s| s.user_id == user_id));
        match entry {
            Some(entry) if entry.is_pending() => {
                entry.status = ShareStatus::Accepted;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_share(
        &self,
        wishlist_id: Uuid,
        user_id: Uuid,
        only_pending: bool,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(wishlist) = tables.wishlists.get_mut(&wishlist_id) else {
            return Ok(false);
        };
        let before = wishlist.shared_with.len();
        wishlist
            .shared_with
            .retain(|s| !(s.user_id == user_id && (!only_pending || s.is_pending())));
        Ok(wishlist.shared_with.len() < before)
    }

    async fn insert_item(&self, item: &WishItem) -> StoreResult<()> {
        self.tables.write().await.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<WishItem>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<Vec<WishItem>> {
        Ok(self.tables.read().await.items_of(wishlist_id))
    }

    async fn update_item(&self, item: &WishItem) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.items.get_mut(&item.id) {
            stored.name = item.name.clone();
            stored.price_cents = item.price_cents;
            stored.currency = item.currency.clone();
            stored.image_url = item.image_url.clone();
            stored.is_favorite = item.is_favorite;
            stored.updated_at = item.updated_at;
        }
        Ok(())
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.items.remove(&id).is_some())
    }

    async fn delete_items_for_wishlist(&self, wishlist_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.items.len();
        tables.items.retain(|_, item| item.wishlist_id != wishlist_id);
        Ok((before - tables.items.len()) as u64)
    }

    async fn try_reserve(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.items.get_mut(&item_id) {
            Some(item) if !item.is_reserved => {
                item.is_reserved = true;
                item.reserved_by = Some(user_id);
                item.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn try_release(&self, item_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.items.get_mut(&item_id) {
            Some(item) if item.is_reserved_by(user_id) => {
                item.is_reserved = false;
                item.reserved_by = None;
                item.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_story(&self, story: &Story) -> StoreResult<()> {
        self.tables.write().await.stories.insert(story.id, story.clone());
        Ok(())
    }

    async fn get_story(&self, id: Uuid) -> StoreResult<Option<Story>> {
        Ok(self.tables.read().await.stories.get(&id).cloned())
    }

    async fn active_stories_for(&self, owner_id: Uuid, now: DateTime<Utc>) -> StoreResult<Vec<Story>> {
        let tables = self.tables.read().await;
        let mut stories: Vec<Story> = tables
            .stories
            .values()
            .filter(|s| s.owner_id == owner_id && s.is_active_at(now))
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn delete_story(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.stories.remove(&id).is_some();
        tables.views.retain(|(story_id, _), _| *story_id != id);
        Ok(removed)
    }

    async fn upsert_story_view(&self, view: &StoryView) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .views
            .insert((view.story_id, view.viewer_id), view.clone());
        Ok(())
    }

    async fn has_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .views
            .contains_key(&(story_id, viewer_id)))
    }

    async fn viewed_story_ids(&self, viewer_id: Uuid, story_ids: &[Uuid]) -> StoreResult<HashSet<Uuid>> {
        let tables = self.tables.read().await;
        Ok(story_ids
            .iter()
            .copied()
            .filter(|story_id| tables.views.contains_key(&(*story_id, viewer_id)))
            .collect())
    }

    async fn story_views(&self, story_id: Uuid) -> StoreResult<Vec<StoryView>> {
        let tables = self.tables.read().await;
        let mut views: Vec<StoryView> = tables
            .views
            .values()
            .filter(|v| v.story_id == story_id)
            .cloned()
            .collect();
        views.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
        Ok(views)
    }

    async fn delete_expired_stories(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let expired: HashSet<Uuid> = tables
            .stories
            .values()
            .filter(|s| !s.is_active_at(now))
            .map(|s| s.id)
            .collect();
        tables.stories.retain(|id, _| !expired.contains(id));
        tables.views.retain(|(story_id, _), _| !expired.contains(story_id));
        Ok(expired.len() as u64)
    }
}
