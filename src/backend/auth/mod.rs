//! Authentication Module
//!
//! User registration, login and bearer-token sessions. Every other API
//! route sits behind the auth middleware, which turns a valid token into an
//! `AuthenticatedUser`.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and validation
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication
//! - Tokens expire after the configured number of days (30 by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
pub use handlers::{get_me, login, signup};
pub use sessions::{Claims, JwtKeys};
