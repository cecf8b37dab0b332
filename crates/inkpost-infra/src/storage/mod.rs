//! Thumbnail file storage.

mod local;
mod memory;

pub use local::LocalThumbnailStore;
pub use memory::InMemoryThumbnailStore;

use inkpost_core::error::StorageError;

/// Reject names that could escape the storage root.
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
