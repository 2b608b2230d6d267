//! Story Data Structures
//!
//! Stories are ephemeral media posts. Every story expires a fixed 24 hours
//! after creation; an expired story is never returned by a query, whether or
//! not the background sweeper has deleted it yet.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require_non_empty, SharedError};

/// Lifetime of a story
pub const STORY_TTL_HOURS: i64 = 24;

/// Kind of media attached to a story
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// A single media element of a story
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryMedia {
    pub media_type: MediaType,
    pub url: String,
    pub captured_at: DateTime<Utc>,
}

/// Represents a story
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub media: Vec<StoryMedia>,
    pub created_at: DateTime<Utc>,
    /// Always `created_at + 24h`
    pub expires_at: DateTime<Utc>,
}

impl Story {
    /// Create a story with a single media element, as of `now`
    pub fn new_at(owner_id: Uuid, media_type: MediaType, url: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            media: vec![StoryMedia {
                media_type,
                url,
                captured_at: now,
            }],
            created_at: now,
            expires_at: now + Duration::hours(STORY_TTL_HOURS),
        }
    }

    /// Whether the story is still visible at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A record that `viewer_id` has seen `story_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryView {
    pub story_id: Uuid,
    pub viewer_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

/// Request to create a story from an already hosted media URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoryRequest {
    pub media_type: MediaType,
    pub media_url: String,
}

impl CreateStoryRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("media_url", &self.media_url)?;
        Ok(())
    }
}

/// A story annotated with whether the requesting user has viewed it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryWithViewStatus {
    #[serde(flatten)]
    pub story: Story,
    pub viewed: bool,
}

/// A friend together with their active stories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendStories {
    pub user_id: Uuid,
    pub username: String,
    /// Newest first
    pub stories: Vec<StoryWithViewStatus>,
    pub has_unviewed: bool,
}

/// Response for listing stories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStoriesResponse {
    pub stories: Vec<Story>,
}

/// Response for the friends story tray
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendsStoriesResponse {
    pub friends: Vec<FriendStories>,
}

/// Response for the owner-only viewer list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListViewersResponse {
    pub viewers: Vec<StoryView>,
}

/// Response for the has-viewed check
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HasViewedResponse {
    pub viewed: bool,
}
