//! Friend Request Data Structure
//!
//! Represents friend requests between users. An accepted request is what
//! makes two users friends; friendship gates story visibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a friend request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    /// Request is pending
    #[default]
    Pending,
    /// Request was accepted
    Accepted,
    /// Request was rejected
    Rejected,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(FriendRequestStatus::Pending),
            "accepted" => Some(FriendRequestStatus::Accepted),
            "rejected" => Some(FriendRequestStatus::Rejected),
            _ => None,
        }
    }
}

/// Represents a friend request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRequest {
    /// Unique request ID
    pub id: Uuid,
    /// User who sent the request
    pub from_user_id: Uuid,
    /// User who received the request
    pub to_user_id: Uuid,
    /// Username of the sender
    pub from_username: String,
    /// Current status of the request
    #[serde(default)]
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    /// Create a new pending friend request
    pub fn new(from_user_id: Uuid, to_user_id: Uuid, from_username: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            from_username,
            status: FriendRequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    /// Check if the request is pending
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

/// Request to send a friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendFriendRequestRequest {
    /// Email of the user to send request to
    pub to_email: String,
}

/// Response after sending a friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendFriendRequestResponse {
    pub request_id: Uuid,
}

/// Request to respond to a friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondFriendRequestRequest {
    /// ID of the request to respond to
    pub request_id: Uuid,
    /// Whether to accept (true) or reject (false)
    pub accept: bool,
}

/// Response for listing friend requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFriendRequestsResponse {
    pub requests: Vec<FriendRequest>,
}

/// A confirmed friend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Friend {
    pub user_id: Uuid,
    pub username: String,
}

/// Response for listing friends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFriendsResponse {
    pub friends: Vec<Friend>,
}
