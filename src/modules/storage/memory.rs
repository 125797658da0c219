use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FileVisibility, ObjectStorage};
use crate::core::error::AppError;

/// In-process storage for router tests
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_uploads: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose uploads always fail
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn generate_key(&self, visibility: FileVisibility, path: &str) -> String {
        match visibility {
            FileVisibility::Public => format!("public/{}", path),
            FileVisibility::Private => format!("private/{}", path),
        }
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        if self.fail_uploads {
            return Err(AppError::Internal(format!("upload of '{}' failed", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        _download_name: Option<&str>,
    ) -> Result<String, AppError> {
        Ok(format!("https://storage.test/{}?signature=test", key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.test/{}", key)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn signed_url_expiry_secs(&self) -> u32 {
        3600
    }
}
