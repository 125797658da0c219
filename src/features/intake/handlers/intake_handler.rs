use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::JsonOrMultipart;
use crate::features::intake::dtos::{IntakeSubmissionDto, IntakeSubmittedDto};
use crate::features::intake::services::{read_intake_form, IntakeService};
use crate::shared::types::ApiResponse;

/// Submit an intake form (business diagnosis, consultation or estimate)
///
/// Accepts the fields as JSON, or as `multipart/form-data` text parts with
/// up to 10 `files` parts. The submission is stored before any email is
/// sent, so a failed notification still returns 201 and is reported in
/// `adminEmailStatus` / `userEmailStatus`.
#[utoipa::path(
    post,
    path = "/api/intake",
    request_body(
        content = IntakeSubmissionDto,
        description = "JSON body. The same fields may be sent as multipart/form-data (see IntakeUploadForm) together with `files` parts.",
    ),
    responses(
        (status = 201, description = "Submission stored", body = ApiResponse<IntakeSubmittedDto>),
        (status = 400, description = "Validation error or rejected file"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Attachment upload or database failure")
    ),
    tag = "intake"
)]
pub async fn submit_intake(
    State(service): State<Arc<IntakeService>>,
    body: JsonOrMultipart<IntakeSubmissionDto>,
) -> Result<(StatusCode, Json<ApiResponse<IntakeSubmittedDto>>)> {
    let (dto, files) = match body {
        JsonOrMultipart::Json(dto) => (dto, Vec::new()),
        JsonOrMultipart::Multipart(multipart) => {
            read_intake_form(multipart, service.config()).await?
        }
    };

    let dto = dto.normalized();
    dto.validate()?;

    let submitted = service.submit(dto, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(submitted),
            Some("お申し込みを受け付けました。担当者よりご連絡いたします。".to_string()),
            None,
        )),
    ))
}
