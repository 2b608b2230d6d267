/**
 * User Model
 *
 * The account record behind every authenticated request. Persistence lives
 * in the entity store; this module owns the type and its validation rules.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::auth::handlers::types::UserResponse;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: uuid::Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User email address
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Client-safe view of the user
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize an email for lookups and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
