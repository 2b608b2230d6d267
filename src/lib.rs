//! WishHub - Main Library
//!
//! WishHub is a backend for shared wishlists and ephemeral stories. Users keep
//! wishlists, share them with other users at read, write or admin level, and
//! reserve items on lists shared with them so gifts are not duplicated. Friends
//! post stories that disappear after 24 hours.
//!
//! # Module Structure
//!
//! - **`shared`** - Domain types and the access evaluator (always compiled)
//! - **`backend`** - Axum HTTP server, persistence and services (`ssr` feature)
//!
//! # Usage
//!
//! ```rust,no_run
//! use wishhub::backend::server::{config::AppConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
