use std::sync::Arc;

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::form_parser::{validate_files, UploadedFile};
use super::intake_notifier::IntakeNotifier;
use crate::core::config::IntakeConfig;
use crate::core::error::{AppError, Result};
use crate::features::intake::dtos::{IntakeSubmissionDto, IntakeSubmittedDto};
use crate::features::intake::models::{
    Attachment, CreateIntakeResponse, EmailDeliveryStatus, IntakeResponse,
};
use crate::modules::storage::{sanitize_filename, FileVisibility, ObjectStorage};

/// Object key path (below the private prefix) for the `index`-th attachment
pub fn attachment_path(id: Uuid, index: usize, file_name: &str) -> String {
    format!("intake/{}/{:02}-{}", id, index + 1, sanitize_filename(file_name))
}

/// Stores intake submissions and sends the notifications
pub struct IntakeService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    notifier: IntakeNotifier,
    config: IntakeConfig,
}

impl IntakeService {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage>,
        notifier: IntakeNotifier,
        config: IntakeConfig,
    ) -> Self {
        Self {
            pool,
            storage,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub async fn submit(
        &self,
        dto: IntakeSubmissionDto,
        files: Vec<UploadedFile>,
    ) -> Result<IntakeSubmittedDto> {
        validate_files(&files, &self.config)?;

        let id = Uuid::new_v4();
        let attachments = self.upload_files(id, &files).await?;

        let created_at = Utc::now();
        let create = CreateIntakeResponse {
            id,
            request_type: dto.request_type,
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            company_name: dto.company_name,
            position: dto.position,
            industry: dto.industry,
            employee_count: dto.employee_count,
            website_url: dto.website_url,
            business_description: dto.business_description,
            challenges: dto.challenges,
            goals: dto.goals,
            budget: dto.budget,
            timeline: dto.timeline,
            preferred_contact: dto.preferred_contact,
            message: dto.message,
            attachments,
            created_at,
            expires_at: created_at + Duration::days(self.config.retention_days),
        };

        let record = match self.insert(create).await {
            Ok(record) => record,
            Err(e) => {
                self.remove_uploads(id, &files).await;
                return Err(e);
            }
        };

        tracing::info!(
            "Intake stored: id={}, request_type={}, attachments={}",
            record.id,
            record.request_type,
            record.attachments.len()
        );

        let (admin_email_status, user_email_status) = self.notifier.notify(&record, &files).await;
        if let Err(e) = self
            .update_delivery_status(record.id, admin_email_status, user_email_status)
            .await
        {
            tracing::error!(
                "Failed to record email delivery status for intake {}: {:?}",
                record.id,
                e
            );
        }

        Ok(IntakeSubmittedDto {
            id: record.id,
            status: record.status,
            admin_email_status,
            user_email_status,
            attachment_count: record.attachments.len(),
        })
    }

    /// Upload every file to private storage. On failure the files already
    /// uploaded for this submission are removed again.
    async fn upload_files(&self, id: Uuid, files: &[UploadedFile]) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let key = self
                .storage
                .generate_key(FileVisibility::Private, &attachment_path(id, index, &file.name));

            if let Err(e) = self
                .storage
                .upload(&key, file.data.to_vec(), &file.content_type)
                .await
            {
                tracing::error!("Attachment upload failed for intake {}: {}", id, e);
                self.remove_uploads(id, &files[..index]).await;
                return Err(AppError::Internal(format!(
                    "Failed to store attachment '{}'",
                    file.name
                )));
            }

            attachments.push(Attachment {
                name: file.name.clone(),
                path: key,
                size: file.size() as i64,
                content_type: file.content_type.clone(),
                sha256: hex::encode(Sha256::digest(&file.data)),
            });
        }

        Ok(attachments)
    }

    async fn remove_uploads(&self, id: Uuid, files: &[UploadedFile]) {
        for (index, file) in files.iter().enumerate() {
            let key = self
                .storage
                .generate_key(FileVisibility::Private, &attachment_path(id, index, &file.name));
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!("Failed to remove orphaned upload '{}': {}", key, e);
            }
        }
    }

    async fn insert(&self, data: CreateIntakeResponse) -> Result<IntakeResponse> {
        sqlx::query_as::<_, IntakeResponse>(
            r#"
            INSERT INTO intake_responses (
                id, request_type, name, email, phone, company_name, position,
                industry, employee_count, website_url, business_description,
                challenges, goals, budget, timeline, preferred_contact, message,
                attachments, created_at, updated_at, expires_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $19, $20
            )
            RETURNING *
            "#,
        )
        .bind(data.id)
        .bind(data.request_type)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.company_name)
        .bind(&data.position)
        .bind(&data.industry)
        .bind(&data.employee_count)
        .bind(&data.website_url)
        .bind(&data.business_description)
        .bind(&data.challenges)
        .bind(&data.goals)
        .bind(&data.budget)
        .bind(&data.timeline)
        .bind(&data.preferred_contact)
        .bind(&data.message)
        .bind(Json(&data.attachments))
        .bind(data.created_at)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert intake response: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update_delivery_status(
        &self,
        id: Uuid,
        admin: EmailDeliveryStatus,
        user: EmailDeliveryStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE intake_responses
            SET admin_email_status = $2, user_email_status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(admin)
        .bind(user)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
