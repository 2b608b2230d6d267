/**
 * Backend Error Types
 *
 * Every service operation fails with one of these variants. Errors from
 * collaborators (entity store, media uploader, notifiers) are folded into
 * `DependencyFailure` with their message preserved, never masked.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use wishhub::backend::error::BackendError;
///
/// let err = BackendError::not_found("Wishlist not found");
/// let err = BackendError::conflict("Item is already reserved");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Entity missing, or a pending invitation that does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Caller is authenticated but not allowed to perform the operation
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// State conflict such as an item already reserved
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Malformed or disallowed input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Store, storage or messaging collaborator failed
    #[error("Dependency failure: {message}")]
    DependencyFailure { message: String },

    /// Missing or invalid identity token
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Validation error raised by a shared type
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::DependencyFailure {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::DependencyFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::PermissionDenied { message }
            | Self::Conflict { message }
            | Self::InvalidInput { message }
            | Self::DependencyFailure { message }
            | Self::Unauthorized { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}
