use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::core::error::{AppError, Result};
use crate::features::contact::dtos::{ContactRequestDto, ContactResponseDto};
use crate::modules::email::{Mailer, OutgoingEmail};
use crate::shared::templates::TemplateEngine;
use crate::shared::text::format_jst;

const CONTACT_TEMPLATE: &str = "contact_admin";

#[derive(Debug, Serialize)]
struct ContactEmailContext<'a> {
    site_name: &'a str,
    submitted_at: String,
    inquiry_type_label: &'static str,
    name: &'a str,
    email: &'a str,
    company: Option<&'a str>,
    phone: Option<&'a str>,
    message: &'a str,
}

/// Forwards contact form submissions to the site operators
pub struct ContactService {
    mailer: Option<Arc<Mailer>>,
    templates: Arc<TemplateEngine>,
    site_name: String,
}

impl ContactService {
    pub fn new(
        mailer: Option<Arc<Mailer>>,
        templates: Arc<TemplateEngine>,
        site_name: String,
    ) -> Self {
        Self {
            mailer,
            templates,
            site_name,
        }
    }

    /// Build the operator notification for a validated submission
    fn compose(&self, mailer: &Mailer, dto: &ContactRequestDto) -> Result<OutgoingEmail> {
        let ctx = ContactEmailContext {
            site_name: &self.site_name,
            submitted_at: format_jst(Utc::now()),
            inquiry_type_label: dto.inquiry_type.label(),
            name: &dto.name,
            email: &dto.email,
            company: dto.company.as_deref(),
            phone: dto.phone.as_deref(),
            message: &dto.message,
        };
        let rendered = self.templates.render_email(CONTACT_TEMPLATE, &ctx)?;

        let subject = format!(
            "[{}] お問い合わせ（{}）: {} 様",
            self.site_name,
            dto.inquiry_type.label(),
            dto.name
        );
        let mut email = mailer.to_admins(subject, Some(dto.email.clone()));
        email.text = rendered.text;
        email.html = Some(rendered.html);
        Ok(email)
    }

    pub async fn submit(&self, dto: ContactRequestDto) -> Result<ContactResponseDto> {
        let mailer = self.mailer.as_ref().ok_or_else(|| {
            AppError::NotConfigured("メール送信が設定されていません".to_string())
        })?;

        let email = self.compose(mailer, &dto)?;
        let message_id = mailer.sender().send(email).await.map_err(|e| {
            tracing::warn!("Contact email delivery failed: {}", e);
            AppError::from(e)
        })?;

        tracing::info!(
            "Contact form forwarded: inquiry_type={:?}, message_id={}",
            dto.inquiry_type,
            message_id
        );

        Ok(ContactResponseDto { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::contact::dtos::InquiryType;
    use crate::modules::email::RecordingSender;

    fn service_with(sender: Arc<RecordingSender>) -> ContactService {
        let mailer = Mailer::new(
            sender,
            "Site <info@example.jp>".into(),
            vec!["owner@example.jp".into()],
        );
        ContactService::new(
            Some(Arc::new(mailer)),
            Arc::new(TemplateEngine::builtin().unwrap()),
            "テスト商会".into(),
        )
    }

    fn request(message: &str) -> ContactRequestDto {
        ContactRequestDto {
            name: "山田太郎".into(),
            email: "taro@example.com".into(),
            company: Some("山田工業".into()),
            phone: None,
            inquiry_type: InquiryType::Pricing,
            message: message.into(),
            consent: true,
        }
    }

    #[tokio::test]
    async fn test_email_goes_to_admins_with_reply_to() {
        let sender = Arc::new(RecordingSender::new());
        let service = service_with(sender.clone());

        service.submit(request("見積もりをお願いします")).await.unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["owner@example.jp".to_string()]);
        assert_eq!(sent[0].reply_to.as_deref(), Some("taro@example.com"));
        assert!(sent[0].subject.contains("料金について"));
        assert!(sent[0].text.contains("見積もりをお願いします"));
        assert!(sent[0].text.contains("山田工業"));
    }

    #[tokio::test]
    async fn test_html_body_escapes_user_input() {
        let sender = Arc::new(RecordingSender::new());
        let service = service_with(sender.clone());

        service
            .submit(request("<script>alert(1)</script>"))
            .await
            .unwrap();

        let html = sender.sent()[0].html.clone().unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_missing_mailer_is_not_configured() {
        let service = ContactService::new(
            None,
            Arc::new(TemplateEngine::builtin().unwrap()),
            "テスト商会".into(),
        );

        let err = service.submit(request("hello")).await.unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
    }
}
