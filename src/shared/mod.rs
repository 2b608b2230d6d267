//! Shared Module
//!
//! Domain types shared by the backend and any client of the HTTP API. These
//! types carry no I/O and serialize to the JSON bodies the API speaks.
//!
//! # Overview
//!
//! - `wishlist` - Wishlists, sharing entries and wish items
//! - `story` - Ephemeral stories and their views
//! - `friends` - Friend requests and the friend list
//! - `access` - The read/write permission evaluator
//! - `error` - Request validation errors

/// Shared error types
pub mod error;

/// Permission evaluation
pub mod access;

/// Wishlists and items
pub mod wishlist;

/// Ephemeral stories
pub mod story;

/// Friend requests and friendships
pub mod friends;

pub use access::{can_read, can_write, Shareable};
pub use error::SharedError;
