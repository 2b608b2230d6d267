//! Wishlists
//!
//! Wishlist CRUD and the sharing workflow. Sharing entries move through
//! `absent -> pending -> accepted`, and a pending entry can be declined back
//! to absent. Only the owner shares or unshares; only the invited user
//! accepts or declines.
//!
//! # Module Structure
//!
//! ```text
//! wishlists/
//! ├── mod.rs       - Module exports and documentation
//! ├── service.rs   - WishlistService and CRUD operations
//! ├── sharing.rs   - Share, respond, remove, invitations
//! └── handlers.rs  - HTTP handlers
//! ```

pub mod handlers;
pub mod service;
pub mod sharing;

pub use service::WishlistService;
