//! Local-disk thumbnail store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use inkpost_core::error::StorageError;
use inkpost_core::ports::ThumbnailStore;

use super::validate_name;

/// Stores thumbnails as plain files under an upload directory.
pub struct LocalThumbnailStore {
    root: PathBuf,
}

impl LocalThumbnailStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if it does not exist.
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", self.root.display(), e)))?;
        tracing::info!(dir = %self.root.display(), "Thumbnail store ready");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ThumbnailStore for LocalThumbnailStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(file = %path.display(), bytes = bytes.len(), "Thumbnail written");
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "Thumbnail removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(file = %path.display(), "Thumbnail already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::Io(format!("remove {}: {}", path.display(), e))),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::Io(format!("stat {}: {}", path.display(), e)))
    }
}
