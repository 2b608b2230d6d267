/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT token generation and validation for user sessions.
 * Tokens are HS256-signed with the configured secret and carry the user id
 * in `sub`.
 */

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Signing keys and token lifetime, built once from configuration
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_days: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_days,
        }
    }

    /// Create a JWT token for a user
    pub fn create_token(&self, user_id: Uuid, email: &str) -> Result<String, BackendError> {
        let now = Utc::now();
        let expires_at = Duration::try_days(self.ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                tracing::error!("Token lifetime of {} days is out of range", self.ttl_days);
                BackendError::dependency("Token lifetime is out of range")
            })?;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify and decode a JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Verify a token and return the user id it was issued for
    pub fn user_id_from_token(&self, token: &str) -> Result<(Uuid, Claims), BackendError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| BackendError::unauthorized("Invalid user ID in token"))?;
        Ok((user_id, claims))
    }
}
