use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::content::dtos::{
    AdminContentQuery, ContentAdminDto, CreateContentDto, UpdateContentDto,
};
use crate::features::content::services::ContentService;
use crate::shared::types::{ApiResponse, Meta};

/// List items in every status (admin only)
///
/// `collection` is `announcements` or `blog`.
#[utoipa::path(
    get,
    path = "/api/admin/{collection}",
    params(
        ("collection" = String, Path, description = "`announcements` or `blog`"),
        AdminContentQuery
    ),
    responses(
        (status = 200, description = "Items retrieved", body = ApiResponse<Vec<ContentAdminDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_content(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ContentService>>,
    AppQuery(query): AppQuery<AdminContentQuery>,
) -> Result<Json<ApiResponse<Vec<ContentAdminDto>>>> {
    let (items, total) = service.list_all(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get one item by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "`announcements` or `blog`"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item retrieved", body = ApiResponse<ContentAdminDto>),
        (status = 404, description = "Item not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_content(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ContentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ContentAdminDto>>> {
    let item = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

/// Create an item (admin only)
///
/// Publishing without `publishedAt` stamps the current time.
#[utoipa::path(
    post,
    path = "/api/admin/{collection}",
    params(
        ("collection" = String, Path, description = "`announcements` or `blog`")
    ),
    request_body = CreateContentDto,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<ContentAdminDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already in use"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_content(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ContentService>>,
    AppJson(dto): AppJson<CreateContentDto>,
) -> Result<(StatusCode, Json<ApiResponse<ContentAdminDto>>)> {
    dto.validate()?;

    tracing::debug!("{} creating '{}'", user.uid, dto.slug);
    let item = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(item),
            Some("作成しました".to_string()),
            None,
        )),
    ))
}

/// Partially update an item (admin only)
///
/// Omitted fields keep their value. An empty string clears `summary`,
/// `category` or `coverImage`.
#[utoipa::path(
    patch,
    path = "/api/admin/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "`announcements` or `blog`"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateContentDto,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<ContentAdminDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_content(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ContentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateContentDto>,
) -> Result<Json<ApiResponse<ContentAdminDto>>> {
    dto.validate()?;

    let item = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(item),
        Some("更新しました".to_string()),
        None,
    )))
}

/// Delete an item (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "`announcements` or `blog`"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 404, description = "Item not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-content",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_content(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ContentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("削除しました".to_string()),
        None,
    )))
}
