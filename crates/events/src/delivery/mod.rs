//! Outbound delivery channels.
//!
//! Each channel is an `async_trait` seam so the dispatcher can be driven by
//! the real transports in production and by fakes in tests:
//!
//! - [`EmailSender`]: one message to a list of recipients ([`email`]).
//! - [`ChatSender`]: a text message to a Slack-compatible incoming webhook
//!   ([`chat`]).
//! - [`WebhookSender`]: a structured JSON POST ([`webhook`]).
//!
//! Sends are single attempts. Failures are returned to the dispatcher,
//! which records them; nothing here retries.

pub mod chat;
pub mod email;
pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

pub use chat::SlackChatSender;
pub use email::{EmailConfig, EmailConfigError, EmailError, SmtpEmailSender};
pub use webhook::HttpWebhookSender;

/// HTTP request timeout for a single chat or webhook delivery.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single delivery attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The channel is missing configuration (mail host, URL).
    #[error("Delivery not configured: {0}")]
    Configuration(String),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Http(#[from] HttpDeliveryError),
}

/// Failure of an HTTP-based delivery.
#[derive(Debug, thiserror::Error)]
pub enum HttpDeliveryError {
    /// The request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Channel seams
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message to every address in `to`. An empty list is a
    /// successful no-op.
    async fn send_email(&self, to: &[String], subject: &str, body: &str)
        -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_chat_message(&self, webhook_url: &str, text: &str) -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send_webhook(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build the HTTP client shared by the chat and webhook senders.
pub(crate) fn http_client() -> Result<reqwest::Client, HttpDeliveryError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// POST `body` as JSON and require a 2xx response.
pub(crate) async fn post_json<T>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<(), DeliveryError>
where
    T: Serialize + ?Sized,
{
    if url.trim().is_empty() {
        return Err(DeliveryError::Configuration("missing webhook url".to_string()));
    }

    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(HttpDeliveryError::from)?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpDeliveryError::HttpStatus(status.as_u16()).into());
    }
    Ok(())
}
