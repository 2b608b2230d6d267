/**
 * Story Service
 *
 * Story lifecycle (create, upload, delete), view tracking and the friends
 * tray. Operations taking `now` exist so the 24 hour window can be tested
 * without waiting; the plain variants use the current time.
 */

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::media::{destination_path, ensure_image_content_type, MediaUploader};
use crate::backend::store::EntityStore;
use crate::shared::access::{can_read, StoryAudience};
use crate::shared::story::{
    CreateStoryRequest, FriendStories, MediaType, Story, StoryView, StoryWithViewStatus,
};

#[derive(Clone)]
pub struct StoryService {
    store: Arc<dyn EntityStore>,
    uploader: Arc<dyn MediaUploader>,
}

impl StoryService {
    pub fn new(store: Arc<dyn EntityStore>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { store, uploader }
    }

    pub async fn create_story(
        &self,
        owner_id: Uuid,
        request: CreateStoryRequest,
    ) -> Result<Story, BackendError> {
        self.create_story_at(owner_id, request, Utc::now()).await
    }

    pub async fn create_story_at(
        &self,
        owner_id: Uuid,
        request: CreateStoryRequest,
        now: DateTime<Utc>,
    ) -> Result<Story, BackendError> {
        request.validate()?;
        let story = Story::new_at(
            owner_id,
            request.media_type,
            request.media_url.trim().to_string(),
            now,
        );
        self.store.insert_story(&story).await?;
        tracing::info!("Story {} created by {}, expires {}", story.id, owner_id, story.expires_at);
        Ok(story)
    }

    /// Upload an image and post it as a story
    pub async fn upload_story(
        &self,
        owner_id: Uuid,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<Story, BackendError> {
        ensure_image_content_type(content_type)?;
        if bytes.is_empty() {
            return Err(BackendError::invalid_input("Image body is empty"));
        }
        let path = destination_path("stories", owner_id, content_type);
        let url = self.uploader.upload(bytes, content_type, &path).await?;
        self.create_story(
            owner_id,
            CreateStoryRequest {
                media_type: MediaType::Image,
                media_url: url,
            },
        )
        .await
    }

    /// Whether `caller` is `owner_id` or one of their accepted friends
    async fn in_audience_of(&self, owner_id: Uuid, caller: Uuid) -> Result<bool, BackendError> {
        if owner_id == caller {
            return Ok(true);
        }
        Ok(self.store.friend_ids(owner_id).await?.contains(&caller))
    }

    /// Active stories of `owner_id`, newest first
    pub async fn list_active_stories(
        &self,
        owner_id: Uuid,
        caller: Uuid,
    ) -> Result<Vec<Story>, BackendError> {
        self.list_active_stories_at(owner_id, caller, Utc::now()).await
    }

    pub async fn list_active_stories_at(
        &self,
        owner_id: Uuid,
        caller: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Story>, BackendError> {
        if !self.in_audience_of(owner_id, caller).await? {
            tracing::warn!("User {} denied stories of {}", caller, owner_id);
            return Err(BackendError::permission_denied(
                "Only friends can see these stories",
            ));
        }
        Ok(self.store.active_stories_for(owner_id, now).await?)
    }

    /// Load a story that is still active at `now`
    async fn load_active(&self, story_id: Uuid, now: DateTime<Utc>) -> Result<Story, BackendError> {
        self.store
            .get_story(story_id)
            .await?
            .filter(|s| s.is_active_at(now))
            .ok_or_else(|| BackendError::not_found("Story not found or expired"))
    }

    pub async fn mark_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> Result<(), BackendError> {
        self.mark_viewed_at(story_id, viewer_id, Utc::now()).await
    }

    /// Record a view; repeated views keep a single record
    pub async fn mark_viewed_at(
        &self,
        story_id: Uuid,
        viewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let story = self.load_active(story_id, now).await?;
        if story.owner_id == viewer_id {
            return Ok(());
        }

        let friends = self.store.friend_ids(story.owner_id).await?;
        let audience = StoryAudience {
            story: &story,
            friends: &friends,
        };
        if !can_read(&audience, viewer_id) {
            tracing::warn!("User {} denied view of story {}", viewer_id, story_id);
            return Err(BackendError::permission_denied(
                "Only friends can view this story",
            ));
        }

        self.store
            .upsert_story_view(&StoryView {
                story_id,
                viewer_id,
                viewed_at: now,
            })
            .await?;
        tracing::debug!("Story {} viewed by {}", story_id, viewer_id);
        Ok(())
    }

    pub async fn has_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> Result<bool, BackendError> {
        Ok(self.store.has_viewed(story_id, viewer_id).await?)
    }

    /// Owner-only delete; views go with the story
    pub async fn delete_story(&self, story_id: Uuid, caller: Uuid) -> Result<(), BackendError> {
        let story = self
            .store
            .get_story(story_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Story not found"))?;
        if story.owner_id != caller {
            return Err(BackendError::permission_denied(
                "Only the owner can delete a story",
            ));
        }
        self.store.delete_story(story_id).await?;
        tracing::info!("Story {} deleted by {}", story_id, caller);
        Ok(())
    }

    /// Owner-only list of who has viewed a story, most recent first
    pub async fn list_viewers(&self, story_id: Uuid, caller: Uuid) -> Result<Vec<StoryView>, BackendError> {
        let story = self
            .store
            .get_story(story_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Story not found"))?;
        if story.owner_id != caller {
            return Err(BackendError::permission_denied(
                "Only the owner can see who viewed a story",
            ));
        }
        Ok(self.store.story_views(story_id).await?)
    }

    pub async fn friends_with_active_stories(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendStories>, BackendError> {
        self.friends_with_active_stories_at(user_id, Utc::now()).await
    }

    /// Accepted friends with at least one active story, most recent poster first
    pub async fn friends_with_active_stories_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<FriendStories>, BackendError> {
        let mut tray = Vec::new();

        for friend_id in self.store.friend_ids(user_id).await? {
            let stories = self.store.active_stories_for(friend_id, now).await?;
            if stories.is_empty() {
                continue;
            }

            let ids: Vec<Uuid> = stories.iter().map(|s| s.id).collect();
            let viewed = self.store.viewed_story_ids(user_id, &ids).await?;
            let stories: Vec<StoryWithViewStatus> = stories
                .into_iter()
                .map(|story| StoryWithViewStatus {
                    viewed: viewed.contains(&story.id),
                    story,
                })
                .collect();

            let username = self
                .store
                .get_user_by_id(friend_id)
                .await?
                .map(|u| u.username)
                .unwrap_or_default();

            tray.push(FriendStories {
                user_id: friend_id,
                username,
                has_unviewed: stories.iter().any(|s| !s.viewed),
                stories,
            });
        }

        tray.sort_by(|a, b| {
            let latest = |f: &FriendStories| f.stories.first().map(|s| s.story.created_at);
            latest(b).cmp(&latest(a))
        });
        Ok(tray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::User;
    use crate::backend::media::MemoryMediaUploader;
    use crate::backend::store::MemoryStore;
    use crate::shared::friends::{FriendRequest, FriendRequestStatus};
    use assert_matches::assert_matches;
    use chrono::Duration;

    struct Fixture {
        service: StoryService,
        alice: User,
        bob: User,
        carol: User,
    }

    async fn befriend(store: &MemoryStore, a: &User, b: &User) {
        let request = FriendRequest::new(a.id, b.id, a.username.clone());
        store.create_friend_request(&request).await.unwrap();
        store
            .set_friend_request_status(request.id, b.id, FriendRequestStatus::Accepted, Utc::now())
            .await
            .unwrap();
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice".into(), "alice@example.com".into(), "x".into());
        let bob = User::new("bob".into(), "bob@example.com".into(), "x".into());
        let carol = User::new("carol".into(), "carol@example.com".into(), "x".into());
        for user in [&alice, &bob, &carol] {
            store.create_user(user).await.unwrap();
        }
        befriend(&store, &alice, &bob).await;

        let service = StoryService::new(store, Arc::new(MemoryMediaUploader::new("https://cdn.test")));
        Fixture { service, alice, bob, carol }
    }

    fn image(url: &str) -> CreateStoryRequest {
        CreateStoryRequest {
            media_type: MediaType::Image,
            media_url: url.into(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_url() {
        let f = fixture().await;
        assert_matches!(
            f.service.create_story(f.alice.id, image("")).await,
            Err(BackendError::SharedError(_))
        );
    }

    #[tokio::test]
    async fn test_views_are_idempotent() {
        let f = fixture().await;
        let story = f.service.create_story(f.alice.id, image("https://cdn/a.png")).await.unwrap();

        f.service.mark_viewed(story.id, f.bob.id).await.unwrap();
        f.service.mark_viewed(story.id, f.bob.id).await.unwrap();

        let viewers = f.service.list_viewers(story.id, f.alice.id).await.unwrap();
        assert_eq!(viewers.len(), 1);
        assert!(f.service.has_viewed(story.id, f.bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_view_is_not_recorded() {
        let f = fixture().await;
        let story = f.service.create_story(f.alice.id, image("u")).await.unwrap();
        f.service.mark_viewed(story.id, f.alice.id).await.unwrap();
        assert!(!f.service.has_viewed(story.id, f.alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_friend_is_denied() {
        let f = fixture().await;
        let story = f.service.create_story(f.alice.id, image("u")).await.unwrap();

        assert_matches!(
            f.service.mark_viewed(story.id, f.carol.id).await,
            Err(BackendError::PermissionDenied { .. })
        );
        assert_matches!(
            f.service.list_active_stories(f.alice.id, f.carol.id).await,
            Err(BackendError::PermissionDenied { .. })
        );
        assert_matches!(
            f.service.list_viewers(story.id, f.bob.id).await,
            Err(BackendError::PermissionDenied { .. })
        );
    }

    #[tokio::test]
    async fn test_expired_story_cannot_be_viewed() {
        let f = fixture().await;
        let t = Utc::now();
        let story = f.service.create_story_at(f.alice.id, image("u"), t).await.unwrap();

        assert_matches!(
            f.service
                .mark_viewed_at(story.id, f.bob.id, t + Duration::hours(25))
                .await,
            Err(BackendError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_delete_is_owner_only() {
        let f = fixture().await;
        let story = f.service.create_story(f.alice.id, image("u")).await.unwrap();
        f.service.mark_viewed(story.id, f.bob.id).await.unwrap();

        assert_matches!(
            f.service.delete_story(story.id, f.bob.id).await,
            Err(BackendError::PermissionDenied { .. })
        );
        f.service.delete_story(story.id, f.alice.id).await.unwrap();
        assert!(!f.service.has_viewed(story.id, f.bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_friends_tray_marks_view_status() {
        let f = fixture().await;
        let t = Utc::now();
        let older = f.service.create_story_at(f.alice.id, image("1"), t).await.unwrap();
        let newer = f
            .service
            .create_story_at(f.alice.id, image("2"), t + Duration::minutes(5))
            .await
            .unwrap();
        f.service
            .mark_viewed_at(older.id, f.bob.id, t + Duration::minutes(6))
            .await
            .unwrap();

        let tray = f
            .service
            .friends_with_active_stories_at(f.bob.id, t + Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(tray.len(), 1);
        assert_eq!(tray[0].username, "alice");
        assert_eq!(tray[0].stories[0].story.id, newer.id);
        assert!(!tray[0].stories[0].viewed);
        assert!(tray[0].stories[1].viewed);
        assert!(tray[0].has_unviewed);

        let later = f
            .service
            .friends_with_active_stories_at(f.bob.id, t + Duration::hours(30))
            .await
            .unwrap();
        assert!(later.is_empty());
    }

    #[tokio::test]
    async fn test_upload_story_creates_image_story() {
        let f = fixture().await;
        let story = f
            .service
            .upload_story(f.alice.id, Bytes::from_static(b"jpeg"), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(story.media[0].media_type, MediaType::Image);
        assert!(story.media[0].url.starts_with("https://cdn.test/stories/"));
    }
}
