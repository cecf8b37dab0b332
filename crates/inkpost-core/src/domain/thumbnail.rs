//! Uploaded thumbnail payloads and stored filename derivation.

use uuid::Uuid;

/// A thumbnail received with a create or edit request.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailUpload {
    /// File name as sent by the client.
    pub file_name: String,
    /// Total size of the upload in bytes.
    ///
    /// Can exceed `bytes.len()` when the receiver stopped buffering an
    /// oversized upload.
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl ThumbnailUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    pub fn exceeds(&self, max_bytes: u64) -> bool {
        self.size > max_bytes
    }
}

/// Derive a collision-resistant storage name: `<basename>_<token>.<extension>`.
///
/// Directory components are dropped, the basename is the text before the first
/// dot and the extension the text after the last one.
pub fn stored_thumbnail_name(original: &str) -> String {
    let file_name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mut segments = file_name.split('.');
    let basename = match segments.next() {
        Some(base) if !base.is_empty() => base,
        _ => "thumbnail",
    };
    let extension = segments.last().filter(|ext| !ext.is_empty());

    let token = Uuid::new_v4().simple();
    match extension {
        Some(ext) => format!("{basename}_{token}.{ext}"),
        None => format!("{basename}_{token}"),
    }
}
