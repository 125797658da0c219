use std::sync::Mutex;

use async_trait::async_trait;

use super::{EmailError, EmailSender, OutgoingEmail};

/// Sender that keeps messages in memory, optionally failing every send
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<u16>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender answering every message with HTTP `status`
    pub fn rejecting(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: OutgoingEmail) -> Result<String, EmailError> {
        if let Some(status) = self.fail_with {
            return Err(EmailError::Rejected {
                status,
                body: "rejected by test sender".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email);
        Ok(format!("test-{}", sent.len()))
    }
}
