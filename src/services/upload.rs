use crate::error::AppError;
use crate::utils::validation::sanitize_filename;
use axum::extract::multipart::Field;
use chrono::Utc;
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// An uploaded file staged on local disk for the duration of one request.
///
/// The file is deleted when the guard is dropped, so the staging directory
/// never accumulates inputs regardless of how the request terminates.
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
}

impl StagedUpload {
    /// Streams a multipart field to `<upload_dir>/<arrival-millis>-<name>`.
    pub async fn from_field(field: Field<'_>, upload_dir: &Path) -> Result<Self, AppError> {
        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let filename = sanitize_filename(&original_name)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let path = upload_dir.join(staged_name(&filename));

        let body_with_io_error =
            field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
        let mut reader = StreamReader::new(body_with_io_error);

        let mut file = tokio::fs::File::create(&path).await?;
        if let Err(e) = tokio::io::copy(&mut reader, &mut file).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
        file.flush().await?;

        tracing::debug!("Staged upload {} at {}", filename, path.display());

        Ok(Self {
            path,
            original_name: filename,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove staged upload {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Arrival-timestamp prefix keeps concurrent uploads with the same client
/// filename from colliding (to millisecond granularity).
fn staged_name(filename: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_name_has_timestamp_prefix() {
        let name = staged_name("clip.mp4");
        let (prefix, rest) = name.split_once('-').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(rest, "clip.mp4");
    }

    #[test]
    fn test_drop_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("123-clip.mp4");
        std::fs::write(&path, b"data").unwrap();

        let upload = StagedUpload {
            path: path.clone(),
            original_name: "clip.mp4".to_string(),
        };
        assert_eq!(upload.original_name(), "clip.mp4");
        drop(upload);

        assert!(!path.exists());
    }
}
