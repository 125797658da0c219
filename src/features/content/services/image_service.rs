//! Cover and inline images for articles, stored under the public prefix.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::content::dtos::UploadedImageDto;
use crate::modules::storage::{FileVisibility, ObjectStorage};
use crate::shared::file_types::{
    image_extension, is_allowed, resolve_content_type, IMAGE_CONTENT_TYPES,
};

pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Image part read from the upload form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("画像のサイズが上限（5MB）を超えています".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", err))
    }
}

/// Take the first `file` (or `image`) part of the form
pub async fn read_image_form(mut multipart: Multipart) -> Result<ImageUpload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !matches!(field.name(), Some("file" | "image")) {
            continue;
        }

        let name = field.file_name().unwrap_or("image").to_string();
        let content_type = resolve_content_type(field.content_type(), &name);
        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(ImageUpload {
            name,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest(
        "画像ファイルを `file` フィールドで送信してください".to_string(),
    ))
}

/// Object path for a new image, e.g. `images/2025/04/<uuid>.png`
pub fn image_path(extension: &str) -> String {
    let now = Utc::now();
    format!(
        "images/{:04}/{:02}/{}.{}",
        now.year(),
        now.month(),
        Uuid::new_v4(),
        extension
    )
}

pub struct ImageUploadService {
    storage: Arc<dyn ObjectStorage>,
}

impl ImageUploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub async fn upload(&self, image: ImageUpload) -> Result<UploadedImageDto> {
        let extension = image_extension(&image.content_type)
            .filter(|_| is_allowed(&image.content_type, IMAGE_CONTENT_TYPES))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "画像形式（{}）はアップロードできません。JPEG・PNG・GIF・WebPのみ対応しています",
                    image.content_type
                ))
            })?;

        if image.data.is_empty() {
            return Err(AppError::BadRequest("画像ファイルが空です".to_string()));
        }
        if image.data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::BadRequest(
                "画像のサイズが上限（5MB）を超えています".to_string(),
            ));
        }

        let key = self
            .storage
            .generate_key(FileVisibility::Public, &image_path(extension));
        let size = image.data.len() as i64;

        self.storage
            .upload(&key, image.data.to_vec(), &image.content_type)
            .await?;

        tracing::info!("Uploaded image '{}' as {} ({} bytes)", image.name, key, size);

        Ok(UploadedImageDto {
            url: self.storage.public_url(&key),
            key,
            content_type: image.content_type,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStorage;

    fn image(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            name: "cover.png".into(),
            content_type: content_type.into(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_image_path_layout() {
        let path = image_path("webp");
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "images");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 2);
        assert!(parts[3].ends_with(".webp"));
    }

    #[tokio::test]
    async fn test_upload_stores_public_object() {
        let storage = Arc::new(MemoryStorage::new());
        let service = ImageUploadService::new(storage.clone());

        let uploaded = service.upload(image("image/png", 128)).await.unwrap();

        assert!(uploaded.key.starts_with("public/images/"));
        assert!(uploaded.key.ends_with(".png"));
        assert_eq!(uploaded.url, format!("https://storage.test/{}", uploaded.key));
        assert_eq!(uploaded.size, 128);
        assert_eq!(storage.content_type(&uploaded.key).as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_rejects_pdf_and_oversized() {
        let storage = Arc::new(MemoryStorage::new());
        let service = ImageUploadService::new(storage.clone());

        assert!(matches!(
            service.upload(image("application/pdf", 10)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.upload(image("image/jpeg", MAX_IMAGE_SIZE + 1)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(storage.keys().is_empty());
    }
}
