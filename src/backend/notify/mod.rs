//! Notifications
//!
//! Fire-and-forget delivery of user-facing notices (wishlist shared, friend
//! request received or accepted). Services call [`dispatch`], which sends on
//! a spawned task and only logs failures; a failed notification never fails
//! the operation that triggered it, and nothing is retried.
//!
//! # Senders
//!
//! - `EmailNotifier` - SMTP through lettre
//! - `SmsNotifier` - JSON POST to an SMS gateway webhook
//! - `LogNotifier` - writes the rendered notice to the log (default)
//! - `FanoutNotifier` - sends through several of the above

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook rejected notification with status {0}")]
    Rejected(u16),
}

/// Who a notification is addressed to
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// The kinds of notice the backend sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    WishlistShared,
    FriendRequestReceived,
    FriendRequestAccepted,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::WishlistShared => "wishlist_shared",
            TemplateKind::FriendRequestReceived => "friend_request_received",
            TemplateKind::FriendRequestAccepted => "friend_request_accepted",
        }
    }

    /// Subject line and body text for this notice
    pub fn render(&self, payload: &Value) -> (String, String) {
        let field = |key| payload_field(payload, key);
        match self {
            TemplateKind::WishlistShared => (
                format!("{} shared a wishlist with you", field("from")),
                format!(
                    "{} invited you to the wishlist \"{}\" with {} access. Open the app to accept.",
                    field("from"),
                    field("title"),
                    field("permission"),
                ),
            ),
            TemplateKind::FriendRequestReceived => (
                format!("{} sent you a friend request", field("from")),
                format!("{} wants to be your friend.", field("from")),
            ),
            TemplateKind::FriendRequestAccepted => (
                format!("{} accepted your friend request", field("from")),
                format!("You and {} are now friends.", field("from")),
            ),
        }
    }
}

fn payload_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("someone")
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &Recipient,
        kind: TemplateKind,
        payload: Value,
    ) -> Result<(), NotifyError>;
}

/// Send a notification in the background, logging any failure
pub fn dispatch(
    notifier: Arc<dyn Notifier>,
    recipient: Recipient,
    kind: TemplateKind,
    payload: Value,
) {
    tokio::spawn(async move {
        match notifier.send(&recipient, kind, payload).await {
            Ok(()) => tracing::debug!("Sent {} notification to {}", kind.as_str(), recipient.user_id),
            Err(e) => tracing::error!(
                "Failed to send {} notification to {}: {}",
                kind.as_str(),
                recipient.user_id,
                e
            ),
        }
    });
}

/// Email delivery over SMTP
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailNotifier {
    pub fn new(
        host: &str,
        username: Option<String>,
        password: Option<String>,
        from: String,
    ) -> Result<Self, NotifyError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?;
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        kind: TemplateKind,
        payload: Value,
    ) -> Result<(), NotifyError> {
        let (subject, body) = kind.render(&payload);
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(recipient.email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

/// SMS delivery through a gateway webhook
pub struct SmsNotifier {
    client: Client,
    webhook_url: String,
}

impl SmsNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        kind: TemplateKind,
        payload: Value,
    ) -> Result<(), NotifyError> {
        let (_, body) = kind.render(&payload);
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&serde_json::json!({
                "user_id": recipient.user_id,
                "kind": kind.as_str(),
                "message": body,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Writes notifications to the log instead of delivering them
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        kind: TemplateKind,
        payload: Value,
    ) -> Result<(), NotifyError> {
        let (subject, _) = kind.render(&payload);
        tracing::info!("Notification for {}: {}", recipient.username, subject);
        Ok(())
    }
}

/// Sends through every configured notifier; the first error wins
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        kind: TemplateKind,
        payload: Value,
    ) -> Result<(), NotifyError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.send(recipient, kind, payload.clone()).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
