/**
 * Error Conversion
 *
 * Conversions into `BackendError` from collaborator errors, and the
 * `IntoResponse` implementation that renders errors as JSON:
 *
 * ```json
 * { "error": "Error message", "status": 404 }
 * ```
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;
use crate::backend::media::UploadError;
use crate::backend::store::StoreError;

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(key) => BackendError::conflict(format!("Duplicate {}", key)),
            other => {
                tracing::error!("Entity store failure: {}", other);
                BackendError::dependency(other.to_string())
            }
        }
    }
}

impl From<UploadError> for BackendError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedContentType(content_type) => BackendError::invalid_input(
                format!("Unsupported content type '{}': only image/* is accepted", content_type),
            ),
            other => {
                tracing::error!("Media upload failure: {}", other);
                BackendError::dependency(other.to_string())
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        BackendError::unauthorized(format!("Invalid token: {}", err))
    }
}

impl From<bcrypt::BcryptError> for BackendError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("Password hashing failure: {:?}", err);
        BackendError::dependency("Password hashing failed")
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected: {}", self);
        }
        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
