use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::content::dtos::{ContentDetailDto, ContentSummaryDto, PublicContentQuery};
use crate::features::content::services::ContentService;
use crate::shared::types::{ApiResponse, Meta};

/// List published items, newest first
///
/// `section` is `news` (announcements) or `blog`. Items with a future
/// `publishedAt` are not listed.
#[utoipa::path(
    get,
    path = "/api/{section}",
    params(
        ("section" = String, Path, description = "`news` or `blog`"),
        PublicContentQuery
    ),
    responses(
        (status = 200, description = "Published items", body = ApiResponse<Vec<ContentSummaryDto>>)
    ),
    tag = "content"
)]
pub async fn list_published(
    State(service): State<Arc<ContentService>>,
    AppQuery(query): AppQuery<PublicContentQuery>,
) -> Result<Json<ApiResponse<Vec<ContentSummaryDto>>>> {
    let (items, total) = service.list_published(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Categories used by published items
#[utoipa::path(
    get,
    path = "/api/{section}/categories",
    params(
        ("section" = String, Path, description = "`news` or `blog`")
    ),
    responses(
        (status = 200, description = "Distinct categories", body = ApiResponse<Vec<String>>)
    ),
    tag = "content"
)]
pub async fn list_categories(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let categories = service.categories().await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// Get a published item by slug, with the Markdown body rendered to HTML
#[utoipa::path(
    get,
    path = "/api/{section}/{slug}",
    params(
        ("section" = String, Path, description = "`news` or `blog`"),
        ("slug" = String, Path, description = "URL slug")
    ),
    responses(
        (status = 200, description = "Item retrieved", body = ApiResponse<ContentDetailDto>),
        (status = 404, description = "Missing, draft or not yet published")
    ),
    tag = "content"
)]
pub async fn get_published(
    State(service): State<Arc<ContentService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ContentDetailDto>>> {
    let item = service.get_published(&slug).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}
