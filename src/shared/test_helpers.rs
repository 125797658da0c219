
use crate::features::auth::model::AuthenticatedUser;
use crate::features::intake::models::{
    EmailDeliveryStatus, IntakeResponse, IntakeStatus, RequestType,
};
use crate::shared::constants::ROLE_ADMIN;

use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use uuid::Uuid;

pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        uid: "test-admin-uid".to_string(),
        email: Some("admin@example.jp".to_string()),
        email_verified: true,
        roles: vec![ROLE_ADMIN.to_string()],
    }
}

pub fn create_regular_user() -> AuthenticatedUser {
    AuthenticatedUser {
        uid: "test-user-uid".to_string(),
        email: Some("user@example.jp".to_string()),
        email_verified: true,
        roles: vec![],
    }
}

async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

async fn inject_regular_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_regular_user());
    next.run(request).await
}

pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

pub fn with_regular_user_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_regular_user_middleware))
}

/// Stored intake submission with only the contact fields filled
pub fn intake_fixture(
    name: &str,
    email: &str,
    request_type: RequestType,
    status: IntakeStatus,
    created_at: DateTime<Utc>,
) -> IntakeResponse {
    IntakeResponse {
        id: Uuid::new_v4(),
        request_type,
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        company_name: None,
        position: None,
        industry: None,
        employee_count: None,
        website_url: None,
        business_description: None,
        challenges: None,
        goals: None,
        budget: None,
        timeline: None,
        preferred_contact: None,
        message: None,
        attachments: Json(Vec::new()),
        status,
        admin_note: None,
        admin_email_status: EmailDeliveryStatus::Sent,
        user_email_status: EmailDeliveryStatus::Sent,
        created_at,
        updated_at: created_at,
        expires_at: created_at + Duration::days(180),
    }
}
