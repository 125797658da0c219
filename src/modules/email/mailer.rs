use std::sync::Arc;

use super::{EmailSender, OutgoingEmail};
use crate::core::config::EmailConfig;

/// Configured sender plus the addresses every notification uses
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    from: String,
    admin_recipients: Vec<String>,
}

impl Mailer {
    pub fn new(sender: Arc<dyn EmailSender>, from: String, admin_recipients: Vec<String>) -> Self {
        Self {
            sender,
            from,
            admin_recipients,
        }
    }

    pub fn from_config(sender: Arc<dyn EmailSender>, config: &EmailConfig) -> Self {
        Self::new(sender, config.from.clone(), config.to.clone())
    }

    pub fn sender(&self) -> &dyn EmailSender {
        self.sender.as_ref()
    }

    /// Message to the site operators, replying to `reply_to` when given
    pub fn to_admins(&self, subject: String, reply_to: Option<String>) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: self.admin_recipients.clone(),
            reply_to,
            subject,
            ..Default::default()
        }
    }

    /// Message to a single visitor
    pub fn to_visitor(&self, address: &str, subject: String) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: vec![address.to_string()],
            subject,
            ..Default::default()
        }
    }
}
