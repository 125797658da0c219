use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// The two content collections; both share one table layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Announcement,
    Blog,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Announcement => "announcements",
            ContentKind::Blog => "blog_posts",
        }
    }

    /// Mount point of the public endpoints
    pub fn public_path(&self) -> &'static str {
        match self {
            ContentKind::Announcement => "/api/news",
            ContentKind::Blog => "/api/blog",
        }
    }

    /// Mount point of the admin endpoints
    pub fn admin_path(&self) -> &'static str {
        match self {
            ContentKind::Announcement => "/api/admin/announcements",
            ContentKind::Blog => "/api/admin/blog",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Announcement => "お知らせ",
            ContentKind::Blog => "ブログ記事",
        }
    }
}

/// Publication state, matching the `content_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "content_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Published,
}

/// Related link shown under an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentLink {
    pub label: String,
    pub url: String,
}

/// Database model shared by `announcements` and `blog_posts`
#[derive(Debug, Clone, FromRow)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub status: ContentStatus,
    pub cover_image: Option<String>,
    pub links: Json<Vec<ContentLink>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Published items become public once their publication time has passed
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ContentStatus::Published && self.published_at.is_some_and(|at| at <= now)
    }
}

/// Publication time to store after a create or update.
///
/// An explicit value wins, then the stored one; publishing without either
/// stamps `now`. Unpublishing keeps the stored time.
pub fn resolve_published_at(
    status: ContentStatus,
    requested: Option<DateTime<Utc>>,
    existing: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    requested
        .or(existing)
        .or_else(|| (status == ContentStatus::Published).then_some(now))
}
