//! Stories
//!
//! Ephemeral media posts visible to the owner and their accepted friends for
//! 24 hours. Queries filter on `expires_at` themselves; the sweeper in
//! [`expiry`] only reclaims storage.

pub mod expiry;
pub mod handlers;
pub mod service;

pub use expiry::spawn_expiry_sweeper;
pub use service::StoryService;
