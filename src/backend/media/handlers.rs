//! `POST /api/media` - upload a raw image body and get back its public URL.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::items::handlers::content_type_of;
use crate::backend::media::{destination_path, ensure_image_content_type};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload_media(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), BackendError> {
    let content_type = content_type_of(&headers);
    ensure_image_content_type(content_type)?;
    if body.is_empty() {
        return Err(BackendError::invalid_input("Image body is empty"));
    }

    let path = destination_path("uploads", auth.user_id, content_type);
    let url = state.uploader.upload(body, content_type, &path).await?;
    tracing::info!("Media uploaded by {} to {}", auth.user_id, path);
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}
