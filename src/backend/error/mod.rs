//! Backend Error Module
//!
//! Error types for the backend server. Services return `BackendError`, and
//! handlers return it directly because it implements `IntoResponse`.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! # Error Taxonomy
//!
//! - `NotFound` - 404
//! - `PermissionDenied` - 403
//! - `Conflict` - 409 (already reserved, lost reservation race, duplicate)
//! - `InvalidInput` - 400
//! - `DependencyFailure` - 503 (store, media upload, notification)
//! - `Unauthorized` - 401 (missing or invalid identity token)
//! - `SharedError` - 400 (validation raised by shared types)

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
