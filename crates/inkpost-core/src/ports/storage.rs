//! Thumbnail file storage port.

use async_trait::async_trait;

use crate::error::StorageError;

/// Durable storage for thumbnail files, addressed by stored filename.
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Write a file under `name`, replacing any previous content.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove a file. Removing a file that does not exist succeeds.
    async fn remove(&self, name: &str) -> Result<(), StorageError>;

    /// Check whether a file is present.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;
}
