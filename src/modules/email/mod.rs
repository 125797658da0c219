//! Transactional email delivery

#[cfg(test)]
mod recording;
mod mailer;
mod resend_client;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::error::AppError;

#[cfg(test)]
pub use recording::RecordingSender;
pub use mailer::Mailer;
pub use resend_client::ResendClient;

/// File embedded in an outgoing email
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Error)]
pub enum EmailError {
    /// The provider answered with a non-success status
    #[error("email provider rejected the message: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("email provider unreachable: {0}")]
    Transport(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::ExternalServiceError(err.to_string())
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one message and return the provider's message id
    async fn send(&self, email: OutgoingEmail) -> Result<String, EmailError>;
}
