//! SMTP email transport
//!
//! Delivery goes through the `EmailTransport` trait so the notification
//! service never depends on a live SMTP server.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// Abstraction over outbound email delivery
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send a plain-text email. Errors are delivery failures the caller is
    /// expected to record, not crash on.
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Lettre-backed SMTP mailer
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    /// Build from config. An unconfigured transport is valid; sends will
    /// fail with a descriptive error that ends up in notification metadata.
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        if !config.is_configured() {
            tracing::warn!("SMTP not configured, email delivery disabled");
            return Ok(Self {
                transport: None,
                from: None,
            });
        }

        let host = config
            .smtp_host
            .as_ref()
            .ok_or_else(|| AppError::Configuration("SMTP_HOST missing".to_string()))?;
        let from_address = config
            .from_address
            .as_ref()
            .ok_or_else(|| AppError::Configuration("EMAIL_FROM_ADDRESS missing".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Configuration(format!("SMTP relay: {}", e)))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = format!("{} <{}>", config.from_name, from_address)
            .parse()
            .map_err(|_| {
                AppError::Configuration("EMAIL_FROM_ADDRESS is not a valid mailbox".to_string())
            })?;

        Ok(Self {
            transport: Some(builder.build()),
            from: Some(from),
        })
    }
}

#[async_trait]
impl EmailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let (transport, from) = match (&self.transport, &self.from) {
            (Some(t), Some(f)) => (t, f),
            _ => return Err(AppError::Email("email transport not configured".to_string())),
        };

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|_| AppError::Email(format!("invalid recipient address: {}", to)))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Email(format!("building message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}
