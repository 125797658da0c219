//! Storage module for file management
//!
//! Intake attachments go under the private prefix and are only reachable
//! through signed URLs; CMS images go under the public prefix.

mod keys;
#[cfg(test)]
mod memory;
mod s3_storage;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use keys::sanitize_filename;
#[cfg(test)]
pub use memory::MemoryStorage;
pub use s3_storage::S3Storage;

/// File visibility for uploaded files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVisibility {
    /// Public files are accessible via direct URL
    Public,
    /// Private files require signed URLs for access
    Private,
}

/// Object storage used by the intake pipeline and the CMS image upload
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Full object key for `path` under the visibility prefix
    fn generate_key(&self, visibility: FileVisibility, path: &str) -> String;

    /// Store `data` under `key`
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Time-limited download link. `download_name` sets the file name the
    /// browser saves the object as.
    async fn signed_url(&self, key: &str, download_name: Option<&str>)
        -> Result<String, AppError>;

    /// Direct URL of a public object
    fn public_url(&self, key: &str) -> String;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Lifetime of URLs returned by [`ObjectStorage::signed_url`]
    fn signed_url_expiry_secs(&self) -> u32;
}
