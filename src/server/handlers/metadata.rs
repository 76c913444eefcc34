//! Metadata extraction endpoint.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, api_error, read_image_field};
use crate::metadata::exiftool::{self, ExtractResponse};
use crate::server::state::AppState;

/// Upload written to disk for exiftool. Removed when dropped.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Reserve a unique path in `dir`, keeping the original extension.
    pub fn reserve(dir: &Path, original_name: &str) -> Self {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| {
                !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .unwrap_or("bin")
            .to_lowercase();
        Self {
            path: dir.join(format!("{}.{}", Uuid::new_v4(), ext)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "[upload] temp file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "[upload] failed to remove temp file"
            ),
        }
    }
}

/// POST /api/extract-metadata - Run exiftool on an uploaded photo.
pub async fn extract(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let (file_name, bytes) = read_image_field(&mut multipart).await?;

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        tracing::error!(
            dir = %upload_dir.display(),
            error = %e,
            "[upload] cannot create upload dir"
        );
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract metadata")
    })?;

    let upload = TempUpload::reserve(upload_dir, &file_name);
    tokio::fs::write(upload.path(), &bytes).await.map_err(|e| {
        tracing::error!(path = %upload.path().display(), error = %e, "[upload] write failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract metadata")
    })?;

    tracing::info!(file = %file_name, bytes = bytes.len(), "[upload] received");

    let raw = exiftool::run(&state.config.exiftool_path, upload.path())
        .await
        .map_err(|e| {
            tracing::error!(file = %file_name, error = %e, "[extract] exiftool failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract metadata")
        })?;

    Ok(Json(exiftool::reshape(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_upload_removed_on_drop() {
        let dir = std::env::temp_dir();
        let path = {
            let upload = TempUpload::reserve(&dir, "IMG_0001.JPG");
            std::fs::write(upload.path(), b"x").unwrap();
            assert!(upload.path().exists());
            assert_eq!(upload.path().extension().and_then(|e| e.to_str()), Some("jpg"));
            upload.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_suspicious_extension_replaced() {
        let upload = TempUpload::reserve(Path::new("/tmp"), "evil.j/../pg");
        assert!(upload.path().starts_with("/tmp"));
        let upload = TempUpload::reserve(Path::new("/tmp"), "noext");
        assert_eq!(upload.path().extension().and_then(|e| e.to_str()), Some("bin"));
    }
}
