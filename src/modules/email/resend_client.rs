//! Resend HTTP API client

use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::{EmailError, EmailSender, OutgoingEmail};

/// Upper bound for one Resend call, attachments included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    /// Base64 encoded file body
    content: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

pub struct ResendClient {
    api_key: String,
    api_base: String,
    http_client: reqwest::Client,
}

impl ResendClient {
    pub fn new(api_key: String, api_base: String) -> Result<Self, EmailError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmailError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

fn build_request(email: &OutgoingEmail) -> SendEmailRequest<'_> {
    SendEmailRequest {
        from: &email.from,
        to: &email.to,
        subject: &email.subject,
        text: &email.text,
        html: email.html.as_deref(),
        reply_to: email.reply_to.as_deref(),
        attachments: email
            .attachments
            .iter()
            .map(|a| AttachmentPayload {
                filename: &a.filename,
                content: BASE64_STANDARD.encode(&a.content),
            })
            .collect(),
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: OutgoingEmail) -> Result<String, EmailError> {
        let url = format!("{}/emails", self.api_base);

        tracing::debug!(
            "Sending email '{}' to {} recipient(s) with {} attachment(s)",
            email.subject,
            email.to.len(),
            email.attachments.len()
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_request(&email))
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Resend API error: HTTP {} - {}", status, body);
            return Err(EmailError::Rejected { status, body });
        }

        let sent = response
            .json::<SendEmailResponse>()
            .await
            .map_err(|e| EmailError::Transport(format!("Invalid Resend response: {}", e)))?;

        tracing::info!("Email '{}' accepted by Resend as {}", email.subject, sent.id);
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::email::EmailAttachment;

    #[test]
    fn test_request_payload_shape() {
        let email = OutgoingEmail {
            from: "Site <info@example.jp>".into(),
            to: vec!["admin@example.jp".into()],
            reply_to: Some("user@example.com".into()),
            subject: "件名".into(),
            text: "本文".into(),
            html: None,
            attachments: vec![EmailAttachment {
                filename: "a.txt".into(),
                content: b"hello".to_vec(),
            }],
        };

        let json = serde_json::to_value(build_request(&email)).unwrap();
        assert_eq!(json["to"][0], "admin@example.jp");
        assert_eq!(json["reply_to"], "user@example.com");
        assert_eq!(json["attachments"][0]["content"], "aGVsbG8=");
        assert!(json.get("html").is_none());
    }

    #[test]
    fn test_attachments_omitted_when_empty() {
        let email = OutgoingEmail {
            from: "a@example.jp".into(),
            to: vec!["b@example.jp".into()],
            subject: "s".into(),
            text: "t".into(),
            ..Default::default()
        };

        let json = serde_json::to_value(build_request(&email)).unwrap();
        assert!(json.get("attachments").is_none());
        assert!(json.get("reply_to").is_none());
    }

    #[test]
    fn test_rejected_maps_to_bad_gateway() {
        let err: crate::core::error::AppError = EmailError::Rejected {
            status: 422,
            body: "invalid from".into(),
        }
        .into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_client_builds_with_trimmed_base() {
        let client = ResendClient::new("re_test".into(), "https://api.resend.com/".into()).unwrap();
        assert_eq!(client.api_base, "https://api.resend.com");
    }
}
