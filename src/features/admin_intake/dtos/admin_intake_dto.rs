use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::intake::models::{
    Attachment, EmailDeliveryStatus, IntakeResponse, IntakeStatus, RequestType,
};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};

/// Filters for the admin intake list
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IntakeListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size", alias = "page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub status: Option<IntakeStatus>,

    pub request_type: Option<RequestType>,

    /// Case-insensitive search over name, email, company name and message
    pub q: Option<String>,

    /// Earliest submission date (inclusive, JST)
    pub from: Option<NaiveDate>,

    /// Latest submission date (inclusive, JST)
    pub to: Option<NaiveDate>,
}

impl IntakeListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        let page_size = if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size.min(MAX_PAGE_SIZE)
        };
        PaginationQuery::new(self.page.max(1), page_size)
    }
}

/// Row of the admin intake list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeListItemDto {
    pub id: Uuid,
    pub request_type: RequestType,
    pub status: IntakeStatus,
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub attachment_count: usize,
    pub admin_email_status: EmailDeliveryStatus,
    pub user_email_status: EmailDeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&IntakeResponse> for IntakeListItemDto {
    fn from(r: &IntakeResponse) -> Self {
        Self {
            id: r.id,
            request_type: r.request_type,
            status: r.status,
            name: r.name.clone(),
            email: r.email.clone(),
            company_name: r.company_name.clone(),
            attachment_count: r.attachments.len(),
            admin_email_status: r.admin_email_status,
            user_email_status: r.user_email_status,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDto {
    pub name: String,
    pub size: i64,
    pub content_type: String,
    pub sha256: String,
    /// Time-limited download link, absent when signing failed
    pub url: Option<String>,
}

impl AttachmentDto {
    pub fn new(attachment: &Attachment, url: Option<String>) -> Self {
        Self {
            name: attachment.name.clone(),
            size: attachment.size,
            content_type: attachment.content_type.clone(),
            sha256: attachment.sha256.clone(),
            url,
        }
    }
}

/// Full submission as shown on the admin detail page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDetailDto {
    pub id: Uuid,
    pub request_type: RequestType,
    pub status: IntakeStatus,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<String>,
    pub website_url: Option<String>,
    pub business_description: Option<String>,
    pub challenges: Option<String>,
    pub goals: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub preferred_contact: Option<String>,
    pub message: Option<String>,
    pub attachments: Vec<AttachmentDto>,
    pub admin_note: Option<String>,
    pub admin_email_status: EmailDeliveryStatus,
    pub user_email_status: EmailDeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IntakeDetailDto {
    pub fn new(r: IntakeResponse, attachments: Vec<AttachmentDto>) -> Self {
        Self {
            id: r.id,
            request_type: r.request_type,
            status: r.status,
            name: r.name,
            email: r.email,
            phone: r.phone,
            company_name: r.company_name,
            position: r.position,
            industry: r.industry,
            employee_count: r.employee_count,
            website_url: r.website_url,
            business_description: r.business_description,
            challenges: r.challenges,
            goals: r.goals,
            budget: r.budget,
            timeline: r.timeline,
            preferred_contact: r.preferred_contact,
            message: r.message,
            attachments,
            admin_note: r.admin_note,
            admin_email_status: r.admin_email_status,
            user_email_status: r.user_email_status,
            created_at: r.created_at,
            updated_at: r.updated_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateIntakeStatusDto {
    pub status: IntakeStatus,

    /// Internal note; replaces the previous note when given
    #[validate(length(max = 2000, message = "メモは2000文字以内で入力してください"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCountDto {
    pub status: IntakeStatus,
    pub count: i64,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSummaryDto {
    pub total: i64,
    /// One entry per status, including zero counts
    pub by_status: Vec<StatusCountDto>,
}
