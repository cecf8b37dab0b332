//! In-memory thumbnail store - for tests and database-less development runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use inkpost_core::error::StorageError;
use inkpost_core::ports::ThumbnailStore;

use super::validate_name;

#[derive(Default)]
pub struct InMemoryThumbnailStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all stored files, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn read(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(name).cloned()
    }
}

#[async_trait]
impl ThumbnailStore for InMemoryThumbnailStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_name(name)?;
        self.files
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        self.files.write().await.remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.files.read().await.contains_key(name))
    }
}
