//! S3-compatible storage client (MinIO, R2, AWS S3)
//!
//! Uses the rust-s3 crate for uploads, deletes and presigned downloads.

use std::collections::HashMap;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::{FileVisibility, ObjectStorage};
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub struct S3Storage {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    signed_url_expiry_secs: u32,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
    private_prefix: String,
}

impl S3Storage {
    /// Create a client from configuration and make sure the bucket exists
    pub async fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to open bucket: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        bucket.set_path_style();

        let storage = Self {
            bucket,
            region,
            credentials,
            signed_url_expiry_secs: config.signed_url_expiry_secs,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix,
            private_prefix: config.private_prefix,
        };

        storage.ensure_bucket_exists().await;

        info!(
            "Storage initialized for endpoint: {}, bucket: {}, public_prefix: {}, private_prefix: {}",
            storage.endpoint,
            storage.bucket.name(),
            storage.public_prefix,
            storage.private_prefix
        );

        Ok(storage)
    }

    /// Create the bucket when missing. Failures are logged, not fatal.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    fn prefix(&self, visibility: FileVisibility) -> &str {
        match visibility {
            FileVisibility::Public => &self.public_prefix,
            FileVisibility::Private => &self.private_prefix,
        }
    }
}

/// `Content-Disposition` value asking the browser to save the object as `name`
fn attachment_disposition(name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}

#[async_trait]
impl ObjectStorage for S3Storage {
    fn generate_key(&self, visibility: FileVisibility, path: &str) -> String {
        format!("{}/{}", self.prefix(visibility), path)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        download_name: Option<&str>,
    ) -> Result<String, AppError> {
        let queries = download_name.map(|name| {
            HashMap::from([(
                "response-content-disposition".to_string(),
                attachment_disposition(name),
            )])
        });

        self.bucket
            .presign_get(key, self.signed_url_expiry_secs, queries)
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to sign URL for '{}': {}", key, e))
            })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted '{}'", key);
        Ok(())
    }

    fn signed_url_expiry_secs(&self) -> u32 {
        self.signed_url_expiry_secs
    }
}
