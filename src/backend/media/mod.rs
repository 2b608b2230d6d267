//! Media Upload
//!
//! Uploads raw image bytes to object storage and returns the public URL.
//! Callers validate the content type with [`ensure_image_content_type`]
//! before any bytes leave the process.
//!
//! # Implementations
//!
//! - `HttpMediaUploader` - `PUT {upload_url}/{path}` with a bearer key
//! - `MemoryMediaUploader` - keeps objects in memory (tests and local runs)

pub mod handlers;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors raised while uploading media
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Store `bytes` at `destination_path` and return its public URL
    async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        destination_path: &str,
    ) -> Result<String, UploadError>;
}

/// Accept only `image/*` content types
pub fn ensure_image_content_type(content_type: &str) -> Result<(), UploadError> {
    match essence(content_type).strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() => Ok(()),
        _ => Err(UploadError::UnsupportedContentType(content_type.to_string())),
    }
}

/// Lowercased media type without parameters
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension_for(content_type: &str) -> &'static str {
    match essence(content_type).as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        _ => "jpg",
    }
}

/// Build a unique destination path such as `stories/{user}/{uuid}.png`
pub fn destination_path(folder: &str, owner_id: Uuid, content_type: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        folder,
        owner_id,
        Uuid::new_v4(),
        extension_for(content_type)
    )
}

/// Uploads to an HTTP object-storage endpoint
pub struct HttpMediaUploader {
    client: Client,
    upload_url: String,
    public_url: String,
    api_key: Option<String>,
}

impl HttpMediaUploader {
    pub fn new(upload_url: String, public_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl MediaUploader for HttpMediaUploader {
    async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        destination_path: &str,
    ) -> Result<String, UploadError> {
        let url = format!("{}/{}", self.upload_url, destination_path);
        tracing::debug!("Uploading {} bytes to {}", bytes.len(), url);

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        Ok(format!("{}/{}", self.public_url, destination_path))
    }
}

/// Keeps uploaded objects in memory
pub struct MemoryMediaUploader {
    base_url: String,
    objects: RwLock<HashMap<String, (String, Bytes)>>,
}

impl MemoryMediaUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl MediaUploader for MemoryMediaUploader {
    async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        destination_path: &str,
    ) -> Result<String, UploadError> {
        self.objects.write().await.insert(
            destination_path.to_string(),
            (content_type.to_string(), bytes),
        );
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            destination_path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_image_content_types_accepted() {
        assert!(ensure_image_content_type("image/png").is_ok());
        assert!(ensure_image_content_type("IMAGE/JPEG; charset=binary").is_ok());
    }

    #[test]
    fn test_other_content_types_rejected() {
        assert_matches!(
            ensure_image_content_type("video/mp4"),
            Err(UploadError::UnsupportedContentType(_))
        );
        assert!(ensure_image_content_type("image/").is_err());
        assert!(ensure_image_content_type("").is_err());
    }

    #[test]
    fn test_destination_path_shape() {
        let owner = Uuid::new_v4();
        let path = destination_path("stories", owner, "image/png");
        assert!(path.starts_with(&format!("stories/{}/", owner)));
        assert!(path.ends_with(".png"));
        assert!(destination_path("items", owner, "IMAGE/PNG").ends_with(".png"));
        assert!(destination_path("items", owner, "Image/WebP; q=1").ends_with(".webp"));
    }

    #[tokio::test]
    async fn test_memory_uploader_returns_public_url() {
        let uploader = MemoryMediaUploader::new("https://cdn.test/");
        let url = uploader
            .upload(Bytes::from_static(b"png"), "image/png", "items/a.png")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/items/a.png");
        assert_eq!(uploader.len().await, 1);
    }

    #[tokio::test]
    async fn test_http_uploader_puts_with_bearer_key() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/bucket/stories/a.png"))
            .and(header("authorization", "Bearer secret-key"))
            .and(header("content-type", "image/png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = HttpMediaUploader::new(
            format!("{}/bucket/", server.uri()),
            "https://cdn.test/bucket".into(),
            Some("secret-key".into()),
        );
        let url = uploader
            .upload(Bytes::from_static(b"png"), "image/png", "stories/a.png")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/bucket/stories/a.png");
    }

    #[tokio::test]
    async fn test_http_uploader_surfaces_rejection() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let uploader = HttpMediaUploader::new(server.uri(), server.uri(), None);
        let result = uploader
            .upload(Bytes::from_static(b"png"), "image/png", "x.png")
            .await;
        assert_matches!(result, Err(UploadError::Rejected { status: 403, .. }));
    }
}
