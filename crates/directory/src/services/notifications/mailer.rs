//! Outbound transport for debt notices.

use std::future::Future;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;

use super::NotifyError;
use super::messages::DebtNotice;

/// Delivery seam for composed notices.
///
/// The run pipeline is generic over this trait so it can be exercised with
/// an in-memory recorder instead of a live SMTP relay.
pub trait Mailer: Send + Sync {
    /// Deliver one notice.
    fn send(&self, notice: &DebtNotice) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a mailer from SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be configured.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, notice: &DebtNotice) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self
                .from_address
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?)
            .to(notice
                .to
                .as_str()
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(notice.to.to_string()))?)
            .subject(notice.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body.clone())?;

        self.transport.send(message).await?;
        Ok(())
    }
}
