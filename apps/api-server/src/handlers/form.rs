//! Multipart post form reader.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;

use inkpost_core::domain::{PostForm, ThumbnailUpload};

use crate::middleware::error::AppError;

/// Upper bound for a single text field.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Read `title`, `categoryId`/`category`, `description` and the `thumbnail`
/// file from a multipart body.
///
/// The thumbnail is counted in full but only buffered up to `max_thumbnail_bytes`,
/// so an oversized upload reaches the service with its real size and no payload.
pub async fn read_post_form(
    mut payload: Multipart,
    max_thumbnail_bytes: u64,
) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            tracing::debug!(error = %e, "Malformed multipart body");
            AppError::BadRequest(format!("malformed multipart body: {e}"))
        })?;

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = read_text(&mut field).await?,
            "categoryId" | "category" => form.category_id = read_text(&mut field).await?,
            "description" => form.description = read_text(&mut field).await?,
            "thumbnail" => form.thumbnail = read_file(&mut field, max_thumbnail_bytes).await?,
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
                drain(&mut field).await?;
            }
        }
    }

    Ok(form)
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest("form field too large".to_string()));
        }
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8(buf).map_err(|_| AppError::BadRequest("form field is not UTF-8".to_string()))
}

async fn read_file(
    field: &mut Field,
    max_bytes: u64,
) -> Result<Option<ThumbnailUpload>, AppError> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or_default()
        .to_string();

    let mut bytes = Vec::new();
    let mut size: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
        size += chunk.len() as u64;
        if size <= max_bytes {
            bytes.extend_from_slice(&chunk);
        }
    }

    // Browsers send an empty part when no file was chosen
    if file_name.is_empty() && size == 0 {
        return Ok(None);
    }

    if size > max_bytes {
        bytes.clear();
    }

    Ok(Some(ThumbnailUpload {
        file_name,
        size,
        bytes,
    }))
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
    }
    Ok(())
}
