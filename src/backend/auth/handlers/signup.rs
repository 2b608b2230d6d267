/**
 * Signup Handler
 *
 * POST /api/auth/signup
 *
 * 1. Validate username, email and password
 * 2. Reject a taken username or email
 * 3. Hash the password with bcrypt at the configured cost
 * 4. Create the user and return a token
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::users::{is_valid_username, normalize_email, User};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid username, email or password
/// * `409 Conflict` - username or email already registered
/// * `503 Service Unavailable` - store failure
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let email = normalize_email(&request.email);
    tracing::info!("Signup request for username: {}, email: {}", request.username, email);

    if !is_valid_username(&request.username) {
        tracing::warn!("Invalid username format: {}", request.username);
        return Err(BackendError::invalid_input(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if !email.contains('@') {
        tracing::warn!("Invalid email format: {}", email);
        return Err(BackendError::invalid_input("Invalid email format"));
    }

    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(BackendError::invalid_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if state.store.get_user_by_username(&request.username).await?.is_some() {
        tracing::warn!("Username already exists: {}", request.username);
        return Err(BackendError::conflict("Username already taken"));
    }

    if state.store.get_user_by_email(&email).await?.is_some() {
        tracing::warn!("Email already exists: {}", email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = bcrypt::hash(&request.password, state.config.bcrypt_cost)?;

    let user = User::new(request.username, email, password_hash);
    // A concurrent signup can take the name between the lookups and here
    if let Err(err) = state.store.create_user(&user).await {
        return Err(match err {
            StoreError::Duplicate(key) => {
                tracing::warn!("Signup lost a race on {}: {}", key, user.username);
                BackendError::conflict("Username or email already taken")
            }
            other => other.into(),
        });
    }

    let token = state.jwt.create_token(user.id, &user.email)?;

    tracing::info!("User created successfully: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.to_response(),
    }))
}
