//! Email delivery via SMTP.
//!
//! [`SmtpEmailSender`] wraps the `lettre` async SMTP transport. It is
//! always constructible: without an [`EmailConfig`] every non-empty send
//! fails with [`DeliveryError::Configuration`], which the dispatcher records
//! like any other failed attempt.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{DeliveryError, EmailSender};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// SMTP settings present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum EmailConfigError {
    #[error("SMTP_PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when neither `SMTP_FROM` nor `FROM_ADDRESS` is set.
const DEFAULT_FROM_ADDRESS: &str = "alerts@herald.local";

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment-style variables.
    ///
    /// Returns `Ok(None)` if `SMTP_HOST` is not set, meaning email delivery
    /// is unconfigured. An unparseable `SMTP_PORT` is an error.
    ///
    /// | Variable                         | Required | Default               |
    /// |----------------------------------|----------|-----------------------|
    /// | `SMTP_HOST`                      | yes      | -                     |
    /// | `SMTP_PORT`                      | no       | `587`                 |
    /// | `SMTP_FROM` / `FROM_ADDRESS`     | no       | `alerts@herald.local` |
    /// | `SMTP_USER`                      | no       | -                     |
    /// | `SMTP_PASSWORD` / `SMTP_PASS`    | no       | -                     |
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, EmailConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(smtp_host) = non_empty("SMTP_HOST") else {
            return Ok(None);
        };
        let smtp_port = match non_empty("SMTP_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| EmailConfigError::InvalidPort(raw.clone()))?,
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            from_address: non_empty("SMTP_FROM")
                .or_else(|| non_empty("FROM_ADDRESS"))
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: non_empty("SMTP_USER"),
            smtp_password: non_empty("SMTP_PASSWORD").or_else(|| non_empty("SMTP_PASS")),
        }))
    }
}

// ---------------------------------------------------------------------------
// SmtpEmailSender
// ---------------------------------------------------------------------------

/// Sends plain-text notification emails over SMTP.
pub struct SmtpEmailSender {
    config: Option<EmailConfig>,
}

impl SmtpEmailSender {
    pub fn new(config: Option<EmailConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("SMTP_HOST not set, email delivery will fail until configured");
        }
        Self { config }
    }

    fn build_message(
        config: &EmailConfig,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(config.from_address.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in to {
            builder = builder.to(recipient.parse()?);
        }
        builder
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    async fn deliver(config: &EmailConfig, message: Message) -> Result<(), EmailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_email(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        if to.is_empty() {
            return Ok(());
        }
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| DeliveryError::Configuration("smtp host not configured".to_string()))?;

        let message = Self::build_message(config, to, subject, body)?;
        Self::deliver(config, message).await?;

        tracing::info!(recipients = to.len(), "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
