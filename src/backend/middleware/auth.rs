/**
 * Authentication Middleware
 *
 * Protects every API route except signup, login and health. The middleware
 * verifies the bearer token, checks that the user still exists, and attaches
 * an `AuthenticatedUser` to the request extensions for the `AuthUser`
 * extractor.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Extract the bearer token from an `Authorization` header value
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is missing, invalid, expired, or
/// names a user that no longer exists.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BackendError::unauthorized("Missing Authorization header"))?;

    let token = bearer_token(auth_header)
        .ok_or_else(|| BackendError::unauthorized("Invalid Authorization header format"))?;

    let (user_id, claims) = app_state.jwt.user_id_from_token(token)?;

    if app_state.store.get_user_by_id(user_id).await?.is_none() {
        tracing::warn!("Token for unknown user {}", user_id);
        return Err(BackendError::unauthorized("User no longer exists"));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user set by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Not authenticated")
            })
    }
}
