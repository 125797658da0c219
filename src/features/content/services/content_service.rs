use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::content::dtos::{
    AdminContentQuery, ContentAdminDto, ContentDetailDto, ContentSummaryDto, CreateContentDto,
    PublicContentQuery, UpdateContentDto,
};
use crate::features::content::models::{
    resolve_published_at, ContentItem, ContentKind, ContentLink,
};
use crate::features::content::services::markdown::render_markdown;
use crate::shared::text::normalize_optional;

/// Visibility condition shared by every public query
const VISIBLE: &str = "status = 'published' AND published_at IS NOT NULL AND published_at <= NOW()";

fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // PostgreSQL unique_violation; the only unique key is the slug
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return AppError::Conflict("このスラッグは既に使われています".to_string());
        }
    }
    AppError::Database(e)
}

/// `%term%` for ILIKE with the wildcard characters in `term` escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Apply a partial update to a stored item.
///
/// Optional text fields are cleared by an empty string.
pub fn apply_update(
    mut item: ContentItem,
    dto: UpdateContentDto,
    now: DateTime<Utc>,
) -> ContentItem {
    if let Some(title) = dto.title {
        item.title = title.trim().to_string();
    }
    if let Some(slug) = dto.slug {
        item.slug = slug.trim().to_string();
    }
    if let Some(content) = dto.content {
        item.content = content;
    }
    if dto.summary.is_some() {
        item.summary = normalize_optional(dto.summary);
    }
    if dto.category.is_some() {
        item.category = normalize_optional(dto.category);
    }
    if dto.cover_image.is_some() {
        item.cover_image = normalize_optional(dto.cover_image);
    }
    if let Some(links) = dto.links {
        item.links = Json(links.into_iter().map(ContentLink::from).collect());
    }
    if let Some(status) = dto.status {
        item.status = status;
    }
    item.published_at =
        resolve_published_at(item.status, dto.published_at, item.published_at, now);
    item
}

/// Announcements or blog posts, depending on `kind`
pub struct ContentService {
    pool: PgPool,
    kind: ContentKind,
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("pool", &"<PgPool>")
            .field("kind", &self.kind)
            .finish()
    }
}

impl ContentService {
    pub fn new(pool: PgPool, kind: ContentKind) -> Self {
        Self { pool, kind }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{}が見つかりません", self.kind.label()))
    }

    // =========================================================================
    // PUBLIC
    // =========================================================================

    pub async fn list_published(
        &self,
        query: &PublicContentQuery,
    ) -> Result<(Vec<ContentSummaryDto>, i64)> {
        let pagination = query.pagination();
        let category = normalize_optional(query.category.clone());
        let table = self.kind.table();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} AND ($1::text IS NULL OR category = $1)",
            table, VISIBLE
        ))
        .bind(&category)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT * FROM {} WHERE {} AND ($1::text IS NULL OR category = $1) \
             ORDER BY published_at DESC LIMIT $2 OFFSET $3",
            table, VISIBLE
        ))
        .bind(&category)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((items.into_iter().map(ContentSummaryDto::from).collect(), total))
    }

    /// Visible item by slug with its body rendered to HTML
    pub async fn get_published(&self, slug: &str) -> Result<ContentDetailDto> {
        let item = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT * FROM {} WHERE slug = $1",
            self.kind.table()
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .filter(|item| item.is_visible_at(Utc::now()))
        .ok_or_else(|| self.not_found())?;

        let html = render_markdown(&item.content);
        Ok(ContentDetailDto::new(item, html))
    }

    /// Distinct categories of visible items
    pub async fn categories(&self) -> Result<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(&format!(
            "SELECT DISTINCT category FROM {} WHERE {} AND category IS NOT NULL ORDER BY category",
            self.kind.table(),
            VISIBLE
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    pub async fn list_all(&self, query: &AdminContentQuery) -> Result<(Vec<ContentAdminDto>, i64)> {
        let pagination = query.pagination();
        let search = normalize_optional(query.q.clone()).map(|q| like_pattern(&q));
        let table = self.kind.table();
        let filter = "($1::content_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR title ILIKE $2 OR slug ILIKE $2 OR summary ILIKE $2)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE {}", table, filter))
                .bind(query.status)
                .bind(&search)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT * FROM {} WHERE {} ORDER BY updated_at DESC LIMIT $3 OFFSET $4",
            table, filter
        ))
        .bind(query.status)
        .bind(&search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((items.into_iter().map(ContentAdminDto::from).collect(), total))
    }

    async fn find(&self, id: Uuid) -> Result<ContentItem> {
        sqlx::query_as::<_, ContentItem>(&format!(
            "SELECT * FROM {} WHERE id = $1",
            self.kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| self.not_found())
    }

    pub async fn get(&self, id: Uuid) -> Result<ContentAdminDto> {
        self.find(id).await.map(ContentAdminDto::from)
    }

    pub async fn create(&self, dto: CreateContentDto) -> Result<ContentAdminDto> {
        let published_at = resolve_published_at(dto.status, dto.published_at, None, Utc::now());
        let links: Vec<ContentLink> = dto.links.into_iter().map(ContentLink::from).collect();

        let item = sqlx::query_as::<_, ContentItem>(&format!(
            "INSERT INTO {} (title, slug, summary, content, category, status, cover_image, links, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
            self.kind.table()
        ))
        .bind(dto.title.trim())
        .bind(dto.slug.trim())
        .bind(normalize_optional(dto.summary))
        .bind(&dto.content)
        .bind(normalize_optional(dto.category))
        .bind(dto.status)
        .bind(normalize_optional(dto.cover_image))
        .bind(Json(links))
        .bind(published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        tracing::info!("Created {} '{}' ({})", self.kind.table(), item.slug, item.id);
        Ok(item.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateContentDto) -> Result<ContentAdminDto> {
        let existing = self.find(id).await?;
        let item = apply_update(existing, dto, Utc::now());

        let updated = sqlx::query_as::<_, ContentItem>(&format!(
            "UPDATE {} SET title = $2, slug = $3, summary = $4, content = $5, category = $6, \
             status = $7, cover_image = $8, links = $9, published_at = $10, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
            self.kind.table()
        ))
        .bind(id)
        .bind(&item.title)
        .bind(&item.slug)
        .bind(&item.summary)
        .bind(&item.content)
        .bind(&item.category)
        .bind(item.status)
        .bind(&item.cover_image)
        .bind(&item.links)
        .bind(item.published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(handle_db_error)?
        .ok_or_else(|| self.not_found())?;

        Ok(updated.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.not_found());
        }

        tracing::info!("Deleted {} {}", self.kind.table(), id);
        Ok(())
    }
}
