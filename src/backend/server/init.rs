/**
 * Server Initialization
 *
 * 1. Open the entity store (PostgreSQL when `DATABASE_URL` is set, otherwise
 *    the in-memory store)
 * 2. Build the media uploader and notification senders from configuration
 * 3. Start the story expiry sweeper
 * 4. Create the router
 *
 * Store and SMTP setup failures abort startup; everything optional falls
 * back to a local implementation with a warning.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;

use crate::backend::media::{HttpMediaUploader, MediaUploader, MemoryMediaUploader};
use crate::backend::notify::{
    EmailNotifier, FanoutNotifier, LogNotifier, Notifier, NotifyError, SmsNotifier,
};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::AppConfig;
use crate::backend::server::state::AppState;
use crate::backend::stories::spawn_expiry_sweeper;
use crate::backend::store::{EntityStore, MemoryStore, PgStore, StoreError};

/// Public URL prefix served for in-memory uploads
const LOCAL_MEDIA_URL: &str = "http://localhost/media";

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to configure notifications: {0}")]
    Notify(#[from] NotifyError),
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn EntityStore>, InitError> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL");
            let store = PgStore::connect(url).await?;
            tracing::info!("Database connected and migrations applied");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_uploader(config: &AppConfig) -> Arc<dyn MediaUploader> {
    match (&config.media.upload_url, &config.media.public_url) {
        (Some(upload_url), public_url) => {
            tracing::info!("Media uploads go to {}", upload_url);
            Arc::new(HttpMediaUploader::new(
                upload_url.clone(),
                public_url.clone().unwrap_or_else(|| upload_url.clone()),
                config.media.api_key.clone(),
            ))
        }
        (None, _) => {
            tracing::warn!("MEDIA_UPLOAD_URL not set, keeping uploads in memory");
            Arc::new(MemoryMediaUploader::new(LOCAL_MEDIA_URL))
        }
    }
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, InitError> {
    let mut senders: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(smtp) = &config.smtp {
        tracing::info!("Email notifications via {}", smtp.host);
        senders.push(Arc::new(EmailNotifier::new(
            &smtp.host,
            smtp.username.clone(),
            smtp.password.clone(),
            smtp.from.clone(),
        )?));
    }
    if let Some(url) = &config.sms_webhook_url {
        tracing::info!("SMS notifications enabled");
        senders.push(Arc::new(SmsNotifier::new(url.clone())));
    }

    Ok(match senders.len() {
        0 => {
            tracing::info!("No notification senders configured, logging notifications");
            Arc::new(LogNotifier)
        }
        1 => senders.remove(0),
        _ => Arc::new(FanoutNotifier::new(senders)),
    })
}

/// Create and configure the Axum application
///
/// Spawns the story expiry sweeper as a side effect; it runs for the life of
/// the process.
pub async fn create_app(config: AppConfig) -> Result<Router, InitError> {
    tracing::info!("Initializing WishHub backend server");

    let store = open_store(&config).await?;
    let uploader = build_uploader(&config);
    let notifier = build_notifier(&config)?;

    spawn_expiry_sweeper(store.clone(), Duration::from_secs(config.story_sweep_secs));
    tracing::info!("Story sweeper running every {}s", config.story_sweep_secs);

    let state = AppState::new(config, store, uploader, notifier);
    Ok(create_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::SmtpConfig;

    #[test]
    fn test_notifier_defaults_to_log() {
        let config = AppConfig::default();
        assert!(build_notifier(&config).is_ok());
    }

    #[tokio::test]
    async fn test_notifier_with_smtp_and_sms() {
        let config = AppConfig::builder()
            .smtp(SmtpConfig {
                host: "smtp.example.com".into(),
                username: Some("user".into()),
                password: Some("pass".into()),
                from: "WishHub <noreply@example.com>".into(),
            })
            .sms_webhook_url("https://sms.example.com/hook")
            .build()
            .unwrap();
        assert!(build_notifier(&config).is_ok());
    }

    #[tokio::test]
    async fn test_memory_uploader_without_media_url() {
        let uploader = build_uploader(&AppConfig::default());
        let url = uploader
            .upload(bytes::Bytes::from_static(b"x"), "image/png", "a/b.png")
            .await
            .unwrap();
        assert_eq!(url, format!("{}/a/b.png", LOCAL_MEDIA_URL));
    }

    #[tokio::test]
    async fn test_create_app_with_memory_store() {
        assert!(create_app(AppConfig::default()).await.is_ok());
    }
}
