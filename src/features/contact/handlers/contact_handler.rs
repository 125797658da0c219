use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::contact::dtos::{ContactRequestDto, ContactResponseDto};
use crate::features::contact::services::ContactService;
use crate::shared::types::ApiResponse;

/// Submit the contact form
///
/// Public endpoint. The submission is emailed to the site operators with
/// `reply_to` set to the submitter. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequestDto,
    responses(
        (status = 200, description = "Message delivered to the operators", body = ApiResponse<ContactResponseDto>),
        (status = 400, description = "Validation error (including missing consent)"),
        (status = 500, description = "Email delivery is not configured"),
        (status = 502, description = "Email provider rejected the message")
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(service): State<Arc<ContactService>>,
    AppJson(dto): AppJson<ContactRequestDto>,
) -> Result<Json<ApiResponse<ContactResponseDto>>> {
    let dto = dto.normalized();
    dto.validate()?;

    let response = service.submit(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(response),
        Some("お問い合わせを受け付けました。担当者よりご連絡いたします。".to_string()),
        None,
    )))
}
