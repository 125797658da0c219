use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of intake form submitted, matching the `intake_request_type` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "intake_request_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Diagnosis,
    Consultation,
    Estimate,
    Other,
}

impl RequestType {
    /// Label used in email subjects and bodies
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Diagnosis => "無料経営診断",
            RequestType::Consultation => "無料相談",
            RequestType::Estimate => "お見積もり",
            RequestType::Other => "お問い合わせ",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Diagnosis => write!(f, "diagnosis"),
            RequestType::Consultation => write!(f, "consultation"),
            RequestType::Estimate => write!(f, "estimate"),
            RequestType::Other => write!(f, "other"),
        }
    }
}

/// Review status, matching the `intake_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "intake_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    New,
    Reviewing,
    InProgress,
    Contracted,
    Closed,
}

impl IntakeStatus {
    pub const ALL: [IntakeStatus; 5] = [
        IntakeStatus::New,
        IntakeStatus::Reviewing,
        IntakeStatus::InProgress,
        IntakeStatus::Contracted,
        IntakeStatus::Closed,
    ];
}

impl std::fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeStatus::New => write!(f, "new"),
            IntakeStatus::Reviewing => write!(f, "reviewing"),
            IntakeStatus::InProgress => write!(f, "in_progress"),
            IntakeStatus::Contracted => write!(f, "contracted"),
            IntakeStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Outcome of a notification email, matching the `email_delivery_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "email_delivery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmailDeliveryStatus {
    Pending,
    Sent,
    Failed,
    /// Email delivery is not configured
    Skipped,
}

/// Uploaded file stored in the `attachments` JSONB column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    /// File name as uploaded (directory components removed)
    pub name: String,
    /// Object key in private storage
    pub path: String,
    pub size: i64,
    pub content_type: String,
    /// Hex SHA-256 of the file body
    pub sha256: String,
}

/// Database model for an intake submission
#[derive(Debug, Clone, FromRow)]
pub struct IntakeResponse {
    pub id: Uuid,
    pub request_type: RequestType,
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
    pub attachments: Json<Vec<Attachment>>,
    pub status: IntakeStatus,
    pub admin_note: Option<String>,
    pub admin_email_status: EmailDeliveryStatus,
    pub user_email_status: EmailDeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Data for inserting a new submission
#[derive(Debug, Clone)]
pub struct CreateIntakeResponse {
    pub id: Uuid,
    pub request_type: RequestType,
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
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
