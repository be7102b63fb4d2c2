//! Multipart image uploads shared by the movie and user routes.

use axum::body::Bytes;
use axum::extract::Multipart;

use super::{ApiError, AppState};
use crate::services::{UploadError, UploadKind};

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Internal(msg) => Self::InternalError(msg),
            other => Self::validation(other.to_string()),
        }
    }
}

pub struct UploadedFile {
    pub original_filename: String,
    pub bytes: Bytes,
}

/// Reads the multipart field named after `kind`, skipping any other fields.
pub async fn read_image(mut multipart: Multipart, kind: UploadKind) -> Result<UploadedFile, ApiError> {
    let expected = kind.field_name();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(expected) {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

        return Ok(UploadedFile {
            original_filename,
            bytes,
        });
    }

    Err(ApiError::validation(format!("Multipart field '{expected}' is required")))
}

pub async fn store_upload(
    state: &AppState,
    kind: UploadKind,
    file: UploadedFile,
) -> Result<String, ApiError> {
    Ok(state
        .upload_service()
        .store(kind, &file.original_filename, &file.bytes)
        .await?)
}

/// Passes `result` through, deleting the stored file first when it is an error.
pub async fn discard_on_error<T, E>(
    state: &AppState,
    filename: &str,
    result: Result<T, E>,
) -> Result<T, E> {
    if result.is_err() {
        state.upload_service().discard(filename).await;
    }
    result
}
