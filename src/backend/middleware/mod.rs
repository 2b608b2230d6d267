//! Middleware Module
//!
//! HTTP middleware applied in front of the handlers.
//!
//! - **`auth`** - Bearer-token authentication for protected routes

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
