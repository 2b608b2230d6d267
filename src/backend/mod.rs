//! Backend Module
//!
//! All server-side code for WishHub: an Axum HTTP API over an entity store,
//! with JWT authentication, a sharing workflow for wishlists, item
//! reservations, and 24 hour stories.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - Route tables and router assembly
//! - **`auth`** - Users, password hashing, JWT sessions, auth handlers
//! - **`middleware`** - Bearer-token authentication
//! - **`error`** - `BackendError` and its HTTP rendering
//! - **`store`** - `EntityStore` trait with PostgreSQL and in-memory backends
//! - **`wishlists`** - Wishlist CRUD and the sharing workflow
//! - **`items`** - Item CRUD, image upload and reservations
//! - **`stories`** - Stories, views and the expiry sweeper
//! - **`friends`** - Friend requests and friend lists
//! - **`media`** - Media upload adapter
//! - **`notify`** - Fire-and-forget email/SMS notifications
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Config, state, initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── error/          - Error types
//! ├── store/          - Persistence
//! ├── wishlists/      - Wishlists and sharing
//! ├── items/          - Items and reservations
//! ├── stories/        - Stories
//! ├── friends/        - Friends
//! ├── media/          - Uploads
//! └── notify/         - Notifications
//! ```
//!
//! # Access Control
//!
//! Every service re-reads the entity it acts on and asks
//! [`crate::shared::access`] whether the caller may read or write it. Nothing
//! is cached between requests.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Persistence
pub mod store;

/// Wishlists and sharing
pub mod wishlists;

/// Wish items and reservations
pub mod items;

/// Ephemeral stories
pub mod stories;

/// Friend requests and friend lists
pub mod friends;

/// Media upload adapter
pub mod media;

/// Notification senders
pub mod notify;

pub use error::BackendError;
pub use server::create_app;
