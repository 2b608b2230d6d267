//! Wishlist Module
//!
//! Data structures for wishlists, their sharing entries and their items:
//!
//! - `Wishlist` - A list owned by one user, optionally public
//! - `SharedWith` - A sharing entry (target user, permission, status)
//! - `WishItem` - An item on a wishlist, with its reservation state
//!
//! # Usage
//!
//! ```rust
//! use wishhub::shared::wishlist::{Wishlist, SharedWith, Permission, WishItem};
//! ```

pub mod item;
pub mod list;

pub use item::{
    CreateItemRequest, ListItemsResponse, ReservationRequest, UpdateItemRequest, WishItem,
};
pub use list::{
    CreateWishlistRequest, Invitation, ListInvitationsResponse, ListWishlistsResponse,
    Permission, RespondInvitationRequest, ShareStatus, ShareWishlistRequest, SharedWith,
    UpdateWishlistRequest, Wishlist, WishlistResponse,
};
