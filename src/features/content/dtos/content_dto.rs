use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::content::models::{ContentItem, ContentLink, ContentStatus};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::{
    validate_http_url, validate_http_url_or_empty, validate_not_blank, SLUG_REGEX,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContentLinkDto {
    #[validate(length(min = 1, max = 100, message = "リンク名は1〜100文字で入力してください"))]
    pub label: String,

    #[validate(custom(function = "validate_http_url"))]
    pub url: String,
}

impl From<ContentLinkDto> for ContentLink {
    fn from(dto: ContentLinkDto) -> Self {
        Self {
            label: dto.label.trim().to_string(),
            url: dto.url.trim().to_string(),
        }
    }
}

/// Create request for an announcement or blog post
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentDto {
    #[validate(
        length(min = 1, max = 200, message = "タイトルは1〜200文字で入力してください"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    /// Lowercase letters, digits and single hyphens, e.g. `spring-campaign`
    #[validate(
        length(min = 1, max = 200),
        regex(path = *SLUG_REGEX, message = "スラッグは半角英小文字・数字・ハイフンで入力してください")
    )]
    pub slug: String,

    #[validate(length(max = 500))]
    pub summary: Option<String>,

    /// Markdown body
    #[serde(default)]
    #[validate(length(max = 100000))]
    pub content: String,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default = "default_status")]
    pub status: ContentStatus,

    #[validate(length(max = 1000), custom(function = "validate_http_url_or_empty"))]
    pub cover_image: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub links: Vec<ContentLinkDto>,

    pub published_at: Option<DateTime<Utc>>,
}

fn default_status() -> ContentStatus {
    ContentStatus::Draft
}

/// Partial update; omitted fields keep their value and an empty string
/// clears an optional text field
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentDto {
    #[validate(
        length(min = 1, max = 200, message = "タイトルは1〜200文字で入力してください"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,

    #[validate(
        length(min = 1, max = 200),
        regex(path = *SLUG_REGEX, message = "スラッグは半角英小文字・数字・ハイフンで入力してください")
    )]
    pub slug: Option<String>,

    #[validate(length(max = 500))]
    pub summary: Option<String>,

    #[validate(length(max = 100000))]
    pub content: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub status: Option<ContentStatus>,

    #[validate(length(max = 1000), custom(function = "validate_http_url_or_empty"))]
    pub cover_image: Option<String>,

    #[validate(nested)]
    pub links: Option<Vec<ContentLinkDto>>,

    pub published_at: Option<DateTime<Utc>>,
}

/// Public list filters
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PublicContentQuery {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    #[serde(default = "default_page_size", alias = "page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub category: Option<String>,
}

impl PublicContentQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Admin list filters
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminContentQuery {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    #[serde(default = "default_page_size", alias = "page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub status: Option<ContentStatus>,

    /// Case-insensitive search in title, slug and summary
    pub q: Option<String>,
}

impl AdminContentQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Public list entry (no body)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<ContentItem> for ContentSummaryDto {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            slug: item.slug,
            summary: item.summary,
            category: item.category,
            cover_image: item.cover_image,
            published_at: item.published_at,
        }
    }
}

/// Public article with the rendered body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetailDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub links: Vec<ContentLink>,
    /// Markdown source
    pub content: String,
    /// Rendered HTML; raw HTML in the source is escaped
    pub content_html: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ContentDetailDto {
    pub fn new(item: ContentItem, content_html: String) -> Self {
        Self {
            id: item.id,
            title: item.title,
            slug: item.slug,
            summary: item.summary,
            category: item.category,
            cover_image: item.cover_image,
            links: item.links.0,
            content: item.content,
            content_html,
            published_at: item.published_at,
            updated_at: item.updated_at,
        }
    }
}

/// Full record for the admin editor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentAdminDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub status: ContentStatus,
    pub cover_image: Option<String>,
    pub links: Vec<ContentLink>,
    pub published_at: Option<DateTime<Utc>>,
    /// Whether the public endpoints currently return this item
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentItem> for ContentAdminDto {
    fn from(item: ContentItem) -> Self {
        let visible = item.is_visible_at(Utc::now());
        Self {
            id: item.id,
            title: item.title,
            slug: item.slug,
            summary: item.summary,
            content: item.content,
            category: item.category,
            status: item.status,
            cover_image: item.cover_image,
            links: item.links.0,
            published_at: item.published_at,
            visible,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Image upload form. Documentation only; the handler reads the parts itself.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    /// JPEG, PNG, GIF or WebP, at most 5 MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImageDto {
    /// Public URL to embed in articles
    pub url: String,
    pub key: String,
    pub content_type: String,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(slug: &str) -> CreateContentDto {
        serde_json::from_value(json!({
            "title": "春のキャンペーン",
            "slug": slug,
            "content": "# 見出し",
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_to_draft() {
        let dto = create("spring-campaign");
        assert_eq!(dto.status, ContentStatus::Draft);
        assert!(dto.links.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_invalid_slugs_rejected() {
        for slug in ["Spring", "spring--campaign", "-spring", "春", "spring_campaign"] {
            let errors = create(slug).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("slug"), "{}", slug);
        }
    }

    #[test]
    fn test_link_urls_validated() {
        let mut dto = create("links");
        dto.links = vec![ContentLinkDto {
            label: "詳細".into(),
            url: "not a url".into(),
        }];
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_slug_validated_when_present() {
        let dto = UpdateContentDto {
            slug: Some("Bad Slug".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
        assert!(UpdateContentDto::default().validate().is_ok());
    }

    #[test]
    fn test_link_urls_require_http_scheme() {
        let mut dto = create("links");
        dto.links = vec![ContentLinkDto {
            label: "詳細".into(),
            url: "javascript:alert(1)".into(),
        }];
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_cover_image_rejects_script_urls() {
        let dto = UpdateContentDto {
            cover_image: Some("javascript:alert(1)".into()),
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cover_image"));

        for ok in ["", "https://cdn.example.jp/a.png"] {
            let dto = UpdateContentDto {
                cover_image: Some(ok.into()),
                ..Default::default()
            };
            assert!(dto.validate().is_ok(), "{:?}", ok);
        }
    }

    #[test]
    fn test_create_cover_image_rejects_script_urls() {
        let mut dto = create("cover");
        dto.cover_image = Some("javascript:alert(1)".into());
        assert!(dto.validate().is_err());

        dto.cover_image = Some("https://cdn.example.jp/a.png".into());
        assert!(dto.validate().is_ok());
    }
}
