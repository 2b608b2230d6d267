//! Friends
//!
//! Friend requests and the friend list. Story visibility is derived from
//! accepted requests, so this module is the source of a user's audience.

pub mod handlers;
pub mod service;

pub use service::FriendService;
