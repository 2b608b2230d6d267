/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * Accepts a username or an email in the `username` field. Unknown users and
 * wrong passwords both yield 401 with the same message.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::users::normalize_email;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Login request for: {}", request.username);

    let user = if request.username.contains('@') {
        state
            .store
            .get_user_by_email(&normalize_email(&request.username))
            .await?
    } else {
        state.store.get_user_by_username(&request.username).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.username);
        BackendError::unauthorized("Invalid credentials")
    })?;

    if !bcrypt::verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err(BackendError::unauthorized("Invalid credentials"));
    }

    let token = state.jwt.create_token(user.id, &user.email)?;

    tracing::info!("User logged in successfully: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.to_response(),
    }))
}
