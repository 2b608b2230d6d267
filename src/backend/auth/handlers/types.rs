/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the signup, login and me handlers.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    /// User's chosen username (3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User's email address
    pub email: String,
    /// User's password (will be hashed before storage)
    pub password: String,
}

/// Login request
///
/// `username` may also hold the account email.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Auth response
///
/// Returned by signup and login: the bearer token plus the account.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
