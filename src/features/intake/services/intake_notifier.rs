//! Admin and submitter emails for a stored intake submission.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use super::form_parser::UploadedFile;
use crate::core::error::Result;
use crate::features::intake::models::{EmailDeliveryStatus, IntakeResponse};
use crate::modules::email::{EmailAttachment, Mailer, OutgoingEmail};
use crate::modules::storage::ObjectStorage;
use crate::shared::templates::TemplateEngine;
use crate::shared::text::format_jst;

const ADMIN_TEMPLATE: &str = "intake_admin";
const USER_TEMPLATE: &str = "intake_user";

#[derive(Debug, Clone, Serialize)]
pub struct EmailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
struct AttachmentLine {
    name: String,
    size: i64,
    url: Option<String>,
    inlined: bool,
}

#[derive(Debug, Serialize)]
struct AdminEmailContext<'a> {
    site_name: &'a str,
    request_type_label: &'static str,
    intake_id: String,
    submitted_at: String,
    fields: &'a [EmailField],
    attachments: Vec<AttachmentLine>,
    link_expiry: Option<String>,
    admin_url: String,
}

#[derive(Debug, Serialize)]
struct UserEmailContext<'a> {
    name: &'a str,
    site_name: &'a str,
    site_url: &'a str,
    request_type_label: &'static str,
    intake_id: String,
    submitted_at: String,
    fields: &'a [EmailField],
    attachment_names: Vec<&'a str>,
}

/// Labelled, non-empty fields of a submission in form order
pub fn summary_fields(record: &IntakeResponse) -> Vec<EmailField> {
    let optional = [
        ("会社名", &record.company_name),
        ("役職", &record.position),
        ("電話番号", &record.phone),
        ("業種", &record.industry),
        ("従業員数", &record.employee_count),
        ("Webサイト", &record.website_url),
        ("事業内容", &record.business_description),
        ("現在の課題", &record.challenges),
        ("目標", &record.goals),
        ("ご予算", &record.budget),
        ("ご希望の時期", &record.timeline),
        ("ご希望の連絡方法", &record.preferred_contact),
        ("ご相談内容", &record.message),
    ];

    let mut fields = vec![
        EmailField {
            label: "お名前",
            value: record.name.clone(),
        },
        EmailField {
            label: "メールアドレス",
            value: record.email.clone(),
        },
    ];
    fields.extend(optional.into_iter().filter_map(|(label, value)| {
        value.as_ref().map(|v| EmailField {
            label,
            value: v.clone(),
        })
    }));
    fields
}

/// Decide per file whether it is attached to the admin email.
///
/// Files are taken in order; a file is inlined when it fits the per-file
/// limit and the running total stays within `total_max`.
pub fn plan_inline_attachments(sizes: &[usize], per_file_max: usize, total_max: usize) -> Vec<bool> {
    let mut total = 0;
    sizes
        .iter()
        .map(|&size| {
            if size <= per_file_max && total + size <= total_max {
                total += size;
                true
            } else {
                false
            }
        })
        .collect()
}

pub struct IntakeNotifier {
    mailer: Option<Arc<Mailer>>,
    templates: Arc<TemplateEngine>,
    storage: Arc<dyn ObjectStorage>,
    site_name: String,
    site_url: String,
    inline_attachment_max: usize,
    inline_total_max: usize,
}

impl IntakeNotifier {
    pub fn new(
        mailer: Option<Arc<Mailer>>,
        templates: Arc<TemplateEngine>,
        storage: Arc<dyn ObjectStorage>,
        site_name: String,
        site_url: String,
        inline_attachment_max: usize,
        inline_total_max: usize,
    ) -> Self {
        Self {
            mailer,
            templates,
            storage,
            site_name,
            site_url: site_url.trim_end_matches('/').to_string(),
            inline_attachment_max,
            inline_total_max,
        }
    }

    /// Send both notifications and report how each went.
    ///
    /// Failures are logged and never propagated; the submission is already
    /// stored at this point.
    pub async fn notify(
        &self,
        record: &IntakeResponse,
        files: &[UploadedFile],
    ) -> (EmailDeliveryStatus, EmailDeliveryStatus) {
        let Some(mailer) = self.mailer.as_deref() else {
            tracing::info!("Email not configured, skipping notifications for intake {}", record.id);
            return (EmailDeliveryStatus::Skipped, EmailDeliveryStatus::Skipped);
        };

        let fields = summary_fields(record);

        let admin_status = match self.admin_email(mailer, record, files, &fields).await {
            Ok(email) => self.deliver(mailer, email, "admin", record).await,
            Err(e) => {
                tracing::warn!("Failed to compose admin email for intake {}: {}", record.id, e);
                EmailDeliveryStatus::Failed
            }
        };

        let user_status = match self.user_email(mailer, record, &fields) {
            Ok(email) => self.deliver(mailer, email, "submitter", record).await,
            Err(e) => {
                tracing::warn!("Failed to compose submitter email for intake {}: {}", record.id, e);
                EmailDeliveryStatus::Failed
            }
        };

        (admin_status, user_status)
    }

    async fn deliver(
        &self,
        mailer: &Mailer,
        email: OutgoingEmail,
        audience: &str,
        record: &IntakeResponse,
    ) -> EmailDeliveryStatus {
        match mailer.sender().send(email).await {
            Ok(message_id) => {
                tracing::info!(
                    "Intake {} {} email sent: message_id={}",
                    record.id,
                    audience,
                    message_id
                );
                EmailDeliveryStatus::Sent
            }
            Err(e) => {
                tracing::warn!("Intake {} {} email failed: {}", record.id, audience, e);
                EmailDeliveryStatus::Failed
            }
        }
    }

    async fn admin_email(
        &self,
        mailer: &Mailer,
        record: &IntakeResponse,
        files: &[UploadedFile],
        fields: &[EmailField],
    ) -> Result<OutgoingEmail> {
        let sizes: Vec<usize> = files.iter().map(UploadedFile::size).collect();
        let plan = plan_inline_attachments(&sizes, self.inline_attachment_max, self.inline_total_max);

        let mut lines = Vec::with_capacity(files.len());
        let mut inline = Vec::new();
        for ((file, stored), inlined) in files.iter().zip(record.attachments.iter()).zip(plan) {
            let url = if inlined {
                inline.push(EmailAttachment {
                    filename: stored.name.clone(),
                    content: file.data.to_vec(),
                });
                None
            } else {
                match self.storage.signed_url(&stored.path, Some(&stored.name)).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!("Could not sign URL for '{}': {}", stored.path, e);
                        None
                    }
                }
            };
            lines.push(AttachmentLine {
                name: stored.name.clone(),
                size: stored.size,
                url,
                inlined,
            });
        }

        let link_expiry = lines.iter().any(|l| l.url.is_some()).then(|| {
            let expiry = Duration::seconds(i64::from(self.storage.signed_url_expiry_secs()));
            format_jst(Utc::now() + expiry)
        });

        let ctx = AdminEmailContext {
            site_name: &self.site_name,
            request_type_label: record.request_type.label(),
            intake_id: record.id.to_string(),
            submitted_at: format_jst(record.created_at),
            fields,
            attachments: lines,
            link_expiry,
            admin_url: format!("{}/admin/intake/{}", self.site_url, record.id),
        };
        let rendered = self.templates.render_email(ADMIN_TEMPLATE, &ctx)?;

        let subject = format!(
            "[{}] 新しい{}の申し込み: {} 様",
            self.site_name,
            record.request_type.label(),
            record.name
        );
        let mut email = mailer.to_admins(subject, Some(record.email.clone()));
        email.text = rendered.text;
        email.html = Some(rendered.html);
        email.attachments = inline;
        Ok(email)
    }

    fn user_email(
        &self,
        mailer: &Mailer,
        record: &IntakeResponse,
        fields: &[EmailField],
    ) -> Result<OutgoingEmail> {
        let ctx = UserEmailContext {
            name: &record.name,
            site_name: &self.site_name,
            site_url: &self.site_url,
            request_type_label: record.request_type.label(),
            intake_id: record.id.to_string(),
            submitted_at: format_jst(record.created_at),
            fields,
            attachment_names: record.attachments.iter().map(|a| a.name.as_str()).collect(),
        };
        let rendered = self.templates.render_email(USER_TEMPLATE, &ctx)?;

        let subject = format!(
            "[{}] {}のお申し込みを受け付けました",
            self.site_name,
            record.request_type.label()
        );
        let mut email = mailer.to_visitor(&record.email, subject);
        email.text = rendered.text;
        email.html = Some(rendered.html);
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::intake::models::{Attachment, IntakeStatus, RequestType};
    use crate::modules::email::RecordingSender;
    use crate::modules::storage::MemoryStorage;
    use axum::body::Bytes;
    use sqlx::types::Json;
    use uuid::Uuid;

    const MB: usize = 1024 * 1024;

    fn record(attachments: Vec<Attachment>) -> IntakeResponse {
        let now = Utc::now();
        IntakeResponse {
            id: Uuid::new_v4(),
            request_type: RequestType::Diagnosis,
            name: "山田太郎".into(),
            email: "taro@example.com".into(),
            phone: None,
            company_name: Some("山田工業".into()),
            position: None,
            industry: None,
            employee_count: None,
            website_url: None,
            business_description: Some("金属加工".into()),
            challenges: Some("<b>人手不足</b>".into()),
            goals: None,
            budget: None,
            timeline: None,
            preferred_contact: None,
            message: None,
            attachments: Json(attachments),
            status: IntakeStatus::New,
            admin_note: None,
            admin_email_status: EmailDeliveryStatus::Pending,
            user_email_status: EmailDeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(180),
        }
    }

    fn upload(name: &str, size: usize) -> (UploadedFile, Attachment) {
        let file = UploadedFile {
            name: name.into(),
            content_type: "application/pdf".into(),
            data: Bytes::from(vec![0u8; size]),
        };
        let stored = Attachment {
            name: name.into(),
            path: format!("private/intake/x/{}", name),
            size: size as i64,
            content_type: "application/pdf".into(),
            sha256: String::new(),
        };
        (file, stored)
    }

    fn notifier(mailer: Option<Arc<Mailer>>) -> IntakeNotifier {
        IntakeNotifier::new(
            mailer,
            Arc::new(TemplateEngine::builtin().unwrap()),
            Arc::new(MemoryStorage::new()),
            "テスト商会".into(),
            "https://example.jp/".into(),
            2 * MB,
            5 * MB,
        )
    }

    fn mailer(sender: Arc<RecordingSender>) -> Option<Arc<Mailer>> {
        Some(Arc::new(Mailer::new(
            sender,
            "info@example.jp".into(),
            vec!["owner@example.jp".into()],
        )))
    }

    #[test]
    fn test_inline_plan_respects_both_limits() {
        let plan = plan_inline_attachments(&[MB, 3 * MB, 2 * MB, 2 * MB, MB], 2 * MB, 5 * MB);
        assert_eq!(plan, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_summary_skips_empty_fields() {
        let fields = summary_fields(&record(vec![]));
        let labels: Vec<_> = fields.iter().map(|f| f.label).collect();
        assert_eq!(
            labels,
            vec!["お名前", "メールアドレス", "会社名", "事業内容", "現在の課題"]
        );
    }

    #[tokio::test]
    async fn test_without_mailer_both_skipped() {
        let result = notifier(None).notify(&record(vec![]), &[]).await;
        assert_eq!(
            result,
            (EmailDeliveryStatus::Skipped, EmailDeliveryStatus::Skipped)
        );
    }

    #[tokio::test]
    async fn test_admin_email_inlines_small_and_links_large_files() {
        let sender = Arc::new(RecordingSender::new());
        let (small, small_meta) = upload("small.pdf", MB);
        let (large, large_meta) = upload("large.pdf", 3 * MB);
        let record = record(vec![small_meta, large_meta]);

        let result = notifier(mailer(sender.clone()))
            .notify(&record, &[small, large])
            .await;
        assert_eq!(result, (EmailDeliveryStatus::Sent, EmailDeliveryStatus::Sent));

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);

        let admin = &sent[0];
        assert_eq!(admin.to, vec!["owner@example.jp".to_string()]);
        assert_eq!(admin.reply_to.as_deref(), Some("taro@example.com"));
        assert_eq!(admin.attachments.len(), 1);
        assert_eq!(admin.attachments[0].filename, "small.pdf");
        assert!(admin
            .text
            .contains("https://storage.test/private/intake/x/large.pdf"));
        assert!(admin.html.as_deref().unwrap().contains("&lt;b&gt;人手不足"));

        let user = &sent[1];
        assert_eq!(user.to, vec!["taro@example.com".to_string()]);
        assert!(user.attachments.is_empty());
        assert!(user.text.contains("small.pdf"));
        assert!(!user.text.contains("storage.test"));
    }

    #[tokio::test]
    async fn test_provider_failure_marks_failed() {
        let sender = Arc::new(RecordingSender::rejecting(500));
        let result = notifier(mailer(sender)).notify(&record(vec![]), &[]).await;
        assert_eq!(
            result,
            (EmailDeliveryStatus::Failed, EmailDeliveryStatus::Failed)
        );
    }
}
