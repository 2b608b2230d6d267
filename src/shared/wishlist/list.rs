//! Wishlist Data Structure
//!
//! A wishlist is owned by one user and can be shared with others. Sharing
//! entries live inside the wishlist itself (`shared_with`), one per target user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require_non_empty, SharedError};

/// Maximum title length accepted on create/update
pub const MAX_TITLE_LEN: usize = 200;

/// Permission granted to a shared-with user
///
/// `Admin` is accepted and stored, but grants exactly what `Write` grants.
/// Sharing and unsharing stay reserved to the owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "admin" => Some(Permission::Admin),
            _ => None,
        }
    }

    /// Whether this level lets the holder modify the wishlist and its items
    pub fn allows_write(&self) -> bool {
        matches!(self, Permission::Write | Permission::Admin)
    }
}

/// Invitation state of a sharing entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    #[default]
    Pending,
    Accepted,
}

impl ShareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareStatus::Pending => "pending",
            ShareStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ShareStatus::Pending),
            "accepted" => Some(ShareStatus::Accepted),
            _ => None,
        }
    }
}

/// A grant of access to a non-owner user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedWith {
    /// The invited user
    pub user_id: Uuid,
    /// Permission level granted once accepted
    pub permission: Permission,
    /// Pending entries grant nothing
    #[serde(default)]
    pub status: ShareStatus,
    /// When the invitation was (last) issued
    pub shared_at: DateTime<Utc>,
}

impl SharedWith {
    /// Create a new pending entry
    pub fn pending(user_id: Uuid, permission: Permission) -> Self {
        Self {
            user_id,
            permission,
            status: ShareStatus::Pending,
            shared_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ShareStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ShareStatus::Accepted
    }
}

/// Represents a wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wishlist {
    /// Unique wishlist ID
    pub id: Uuid,
    /// Owner, the implicit full-access principal
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Public wishlists are readable by any authenticated user
    pub is_public: bool,
    pub is_favorite: bool,
    /// Items contained in this wishlist
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
    /// Sharing entries, at most one per user, never the owner
    #[serde(default)]
    pub shared_with: Vec<SharedWith>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    /// Create a new, unshared wishlist
    pub fn new(owner_id: Uuid, title: String, description: String, is_public: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            is_public,
            is_favorite: false,
            item_ids: Vec::new(),
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The sharing entry for a user, if any
    pub fn share_for(&self, user_id: Uuid) -> Option<&SharedWith> {
        self.shared_with.iter().find(|s| s.user_id == user_id)
    }
}

fn validate_title(title: &str) -> Result<(), SharedError> {
    if require_non_empty("title", title)?.chars().count() > MAX_TITLE_LEN {
        return Err(SharedError::validation(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(())
}

/// Request to create a wishlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWishlistRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl CreateWishlistRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_title(&self.title)
    }
}

/// Partial update of a wishlist; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWishlistRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl UpdateWishlistRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// Apply the present fields to a wishlist
    pub fn apply_to(&self, wishlist: &mut Wishlist) {
        if let Some(title) = &self.title {
            wishlist.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            wishlist.description = description.clone();
        }
        if let Some(is_public) = self.is_public {
            wishlist.is_public = is_public;
        }
        if let Some(is_favorite) = self.is_favorite {
            wishlist.is_favorite = is_favorite;
        }
        wishlist.updated_at = Utc::now();
    }
}

/// A wishlist as seen by a particular caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistResponse {
    #[serde(flatten)]
    pub wishlist: Wishlist,
    /// Whether the caller owns this wishlist
    pub is_owner: bool,
    /// Whether the caller may modify this wishlist and its items
    pub can_write: bool,
}

/// Response for listing wishlists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWishlistsResponse {
    pub wishlists: Vec<WishlistResponse>,
}

/// Request to share a wishlist, by user id or by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareWishlistRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub email: Option<String>,
    pub permission: Permission,
}

/// Request to accept or decline an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondInvitationRequest {
    pub accept: bool,
}

/// A pending invitation, as shown to the invited user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invitation {
    pub wishlist_id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub permission: Permission,
    pub shared_at: DateTime<Utc>,
}

/// Response for listing pending invitations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListInvitationsResponse {
    pub invitations: Vec<Invitation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_levels() {
        assert!(!Permission::Read.allows_write());
        assert!(Permission::Write.allows_write());
        assert!(Permission::Admin.allows_write());
        assert_eq!(Permission::parse("ADMIN"), Some(Permission::Admin));
        assert_eq!(Permission::parse("owner"), None);
    }

    #[test]
    fn test_new_wishlist_is_unshared() {
        let owner = Uuid::new_v4();
        let wishlist = Wishlist::new(owner, "Birthday".into(), String::new(), false);
        assert_eq!(wishlist.owner_id, owner);
        assert!(wishlist.shared_with.is_empty());
        assert!(wishlist.share_for(owner).is_none());
    }

    #[test]
    fn test_create_request_rejects_blank_title() {
        let request = CreateWishlistRequest {
            title: "   ".into(),
            description: None,
            is_public: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut wishlist = Wishlist::new(Uuid::new_v4(), "Old".into(), "desc".into(), false);
        let patch = UpdateWishlistRequest {
            title: Some("  New ".into()),
            is_public: Some(true),
            ..Default::default()
        };
        patch.apply_to(&mut wishlist);
        assert_eq!(wishlist.title, "New");
        assert_eq!(wishlist.description, "desc");
        assert!(wishlist.is_public);
        assert!(!wishlist.is_favorite);
    }

    #[test]
    fn test_share_status_default_is_pending() {
        let entry: SharedWith = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::new_v4(),
            "permission": "write",
            "shared_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.permission, Permission::Write);
    }
}
