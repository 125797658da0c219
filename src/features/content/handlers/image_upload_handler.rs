use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::content::dtos::{ImageUploadForm, UploadedImageDto};
use crate::features::content::services::{read_image_form, ImageUploadService};
use crate::shared::types::ApiResponse;

/// Upload a cover or inline image (admin only)
///
/// The image is stored publicly; embed the returned `url` in articles.
#[utoipa::path(
    post,
    path = "/api/admin/uploads/images",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<UploadedImageDto>),
        (status = 400, description = "Not an image or too large"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ImageUploadService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadedImageDto>>)> {
    let image = read_image_form(multipart).await?;
    let uploaded = service.upload(image).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(uploaded), None, None)),
    ))
}
