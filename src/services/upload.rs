use crate::config::UploadConfig;
use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File is empty")]
    Empty,

    #[error("File exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UploadError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// What an uploaded image is for. Only used for logging and field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Poster,
    Background,
}

impl UploadKind {
    /// Multipart field the file is expected in.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Poster => "poster",
            Self::Background => "backgroundImage",
        }
    }
}

/// Stores uploaded images under random names in the upload directory.
pub struct UploadService {
    config: UploadConfig,
}

impl UploadService {
    #[must_use]
    pub const fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn directory(&self) -> PathBuf {
        PathBuf::from(&self.config.directory)
    }

    /// Lowercased extension if it is on the allow list.
    fn accepted_extension(&self, original_filename: &str) -> Result<String, UploadError> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| UploadError::UnsupportedType(original_filename.to_string()))?;

        if self.config.allowed_extensions.iter().any(|e| e == &extension) {
            Ok(extension)
        } else {
            Err(UploadError::UnsupportedType(extension))
        }
    }

    /// Writes `bytes` as `<uuid>.<ext>` and returns the stored filename.
    pub async fn store(
        &self,
        kind: UploadKind,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let extension = self.accepted_extension(original_filename)?;

        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.config.max_file_size_bytes {
            return Err(UploadError::TooLarge(self.config.max_file_size_bytes));
        }

        let dir = self.directory();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let filename = format!("{}.{extension}", uuid::Uuid::new_v4());
        let file_path = dir.join(&filename);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", file_path.display()))?;

        let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
        info!(
            kind = ?kind,
            size = bytes.len(),
            mime = %mime,
            path = %file_path.display(),
            "Stored upload"
        );

        Ok(filename)
    }

    /// Removes a stored upload that ended up unused. Failures are only logged.
    pub async fn discard(&self, filename: &str) {
        let path = self.directory().join(filename);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), "Failed to remove unused upload: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &Path) -> UploadService {
        UploadService::new(UploadConfig {
            directory: dir.to_string_lossy().into_owned(),
            max_file_size_bytes: 16,
            ..UploadConfig::default()
        })
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("marquee-upload-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_store_writes_file_with_random_name() {
        let dir = temp_dir();
        let uploads = service(&dir);

        let name = uploads
            .store(UploadKind::Poster, "Poster.PNG", b"\x89PNG....")
            .await
            .unwrap();

        assert!(name.ends_with(".png"));
        assert_ne!(name, "Poster.PNG");
        assert_eq!(std::fs::read(dir.join(&name)).unwrap(), b"\x89PNG....");

        uploads.discard(&name).await;
        assert!(!dir.join(&name).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_store_rejects_bad_input() {
        let dir = temp_dir();
        let uploads = service(&dir);

        assert!(matches!(
            uploads.store(UploadKind::Avatar, "avatar.gif", b"GIF89a").await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            uploads.store(UploadKind::Avatar, "noext", b"data").await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            uploads.store(UploadKind::Avatar, "a.jpg", b"").await,
            Err(UploadError::Empty)
        ));
        assert!(matches!(
            uploads.store(UploadKind::Avatar, "a.jpg", &[0_u8; 17]).await,
            Err(UploadError::TooLarge(16))
        ));
        assert!(!dir.exists());
    }
}
