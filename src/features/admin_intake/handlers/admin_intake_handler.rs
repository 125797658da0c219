use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::admin_intake::dtos::{
    IntakeDetailDto, IntakeListItemDto, IntakeListQuery, IntakeSummaryDto, UpdateIntakeStatusDto,
};
use crate::features::admin_intake::services::AdminIntakeService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List intake submissions (admin only)
///
/// Filtering happens on a short-lived in-memory snapshot of all submissions.
#[utoipa::path(
    get,
    path = "/api/admin/intake",
    params(IntakeListQuery),
    responses(
        (status = 200, description = "Submissions retrieved", body = ApiResponse<Vec<IntakeListItemDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-intake",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_intakes(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminIntakeService>>,
    AppQuery(query): AppQuery<IntakeListQuery>,
) -> Result<Json<ApiResponse<Vec<IntakeListItemDto>>>> {
    let (items, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Count submissions per status (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/intake/summary",
    responses(
        (status = 200, description = "Counts retrieved", body = ApiResponse<IntakeSummaryDto>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-intake",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn intake_summary(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminIntakeService>>,
) -> Result<Json<ApiResponse<IntakeSummaryDto>>> {
    let summary = service.summary().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Get one submission with attachment download links (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/intake/{id}",
    params(
        ("id" = Uuid, Path, description = "Intake response ID")
    ),
    responses(
        (status = 200, description = "Submission retrieved", body = ApiResponse<IntakeDetailDto>),
        (status = 404, description = "Submission not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-intake",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_intake(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminIntakeService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IntakeDetailDto>>> {
    let detail = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Change the review status of a submission (admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/intake/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Intake response ID")
    ),
    request_body = UpdateIntakeStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<IntakeDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Submission not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-intake",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_intake_status(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AdminIntakeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateIntakeStatusDto>,
) -> Result<Json<ApiResponse<IntakeDetailDto>>> {
    dto.validate()?;

    let actor = user.email.as_deref().unwrap_or(&user.uid);
    let detail = service.update_status(id, dto, actor).await?;
    Ok(Json(ApiResponse::success(
        Some(detail),
        Some("ステータスを更新しました".to_string()),
        None,
    )))
}
