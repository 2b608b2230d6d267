/**
 * Get Current User Handler
 *
 * GET /api/auth/me, behind the auth middleware.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let user = state
        .store
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", auth.user_id);
            BackendError::not_found("User not found")
        })?;

    Ok(Json(user.to_response()))
}
