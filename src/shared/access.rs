//! Access Control
//!
//! Every permission check in the backend goes through `can_read` and
//! `can_write`. They are pure functions over the current state of an entity:
//! no caching, no side effects.
//!
//! # Rules
//!
//! - **Read**: owner, or the entity is public, or an *accepted* grant at any level
//! - **Write**: owner, or an *accepted* grant at `write` or `admin`
//!
//! Public visibility never grants write, and pending grants grant nothing.
//! Wish items are checked against their parent wishlist; stories are checked
//! through a [`StoryAudience`] (the owner plus accepted friends).

use uuid::Uuid;

use crate::shared::story::Story;
use crate::shared::wishlist::{Permission, ShareStatus, Wishlist};

/// A user's grant on a shareable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub permission: Permission,
    pub status: ShareStatus,
}

impl Grant {
    fn is_accepted(&self) -> bool {
        self.status == ShareStatus::Accepted
    }
}

/// An entity whose access is decided by ownership and sharing
pub trait Shareable {
    fn owner_id(&self) -> Uuid;

    fn is_public(&self) -> bool;

    /// The grant held by `user_id`, if any
    fn grant_for(&self, user_id: Uuid) -> Option<Grant>;
}

impl Shareable for Wishlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn is_public(&self) -> bool {
        self.is_public
    }

    fn grant_for(&self, user_id: Uuid) -> Option<Grant> {
        self.share_for(user_id).map(|s| Grant {
            permission: s.permission,
            status: s.status,
        })
    }
}

/// A story together with the owner's accepted friends
pub struct StoryAudience<'a> {
    pub story: &'a Story,
    pub friends: &'a [Uuid],
}

impl Shareable for StoryAudience<'_> {
    fn owner_id(&self) -> Uuid {
        self.story.owner_id
    }

    fn is_public(&self) -> bool {
        false
    }

    fn grant_for(&self, user_id: Uuid) -> Option<Grant> {
        self.friends.contains(&user_id).then_some(Grant {
            permission: Permission::Read,
            status: ShareStatus::Accepted,
        })
    }
}

pub fn is_owner<E: Shareable + ?Sized>(entity: &E, user_id: Uuid) -> bool {
    entity.owner_id() == user_id
}

/// Whether `user_id` may read `entity`
pub fn can_read<E: Shareable + ?Sized>(entity: &E, user_id: Uuid) -> bool {
    if is_owner(entity, user_id) || entity.is_public() {
        return true;
    }
    entity
        .grant_for(user_id)
        .is_some_and(|grant| grant.is_accepted())
}

/// Whether `user_id` may modify `entity`
pub fn can_write<E: Shareable + ?Sized>(entity: &E, user_id: Uuid) -> bool {
    if is_owner(entity, user_id) {
        return true;
    }
    entity
        .grant_for(user_id)
        .is_some_and(|grant| grant.is_accepted() && grant.permission.allows_write())
}
