use crate::errors::FileServiceError;
use chrono::Local;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No file existed at the destination; it was created.
    Created,
    /// A file existed with different content; it was renamed aside and the
    /// upload was written to the original name.
    Renamed(PathBuf),
    /// A file existed with identical content (same MD5); nothing was
    /// written.
    SameMd5,
}

/// Mirrors `file_upload_utils.go`: `checkFileExists` + `renameFile`. The
/// rename timestamp format (`%Y%m%d-%H%M`) is preserved verbatim from the
/// original's `"20060102-1504"` Go time layout.
pub async fn save_upload(dest: &Path, body: &[u8]) -> Result<UploadOutcome, FileServiceError> {
    if !dest.exists() {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, body).await?;
        return Ok(UploadOutcome::Created);
    }

    let existing = tokio::fs::read(dest).await?;
    if md5::compute(&existing).0 == md5::compute(body).0 {
        return Ok(UploadOutcome::SameMd5);
    }

    let renamed_to = renamed_path(dest);
    tokio::fs::rename(dest, &renamed_to).await?;
    tokio::fs::write(dest, body).await?;
    Ok(UploadOutcome::Renamed(renamed_to))
}

fn renamed_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = original.extension().map(|e| e.to_string_lossy().to_string());
    let timestamp = Local::now().format("%Y%m%d-%H%M").to_string();

    let file_name = match ext {
        Some(ext) => format!("{stem}-{timestamp}.{ext}"),
        None => format!("{stem}-{timestamp}"),
    };
    original.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("upload.bin");
        let outcome = save_upload(&dest, b"hello").await.unwrap();
        assert_eq!(outcome, UploadOutcome::Created);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn identical_content_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("upload.bin");
        tokio::fs::write(&dest, b"hello").await.unwrap();
        let outcome = save_upload(&dest, b"hello").await.unwrap();
        assert_eq!(outcome, UploadOutcome::SameMd5);
    }

    #[tokio::test]
    async fn differing_content_renames_the_old_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("upload.txt");
        tokio::fs::write(&dest, b"old").await.unwrap();
        let outcome = save_upload(&dest, b"new").await.unwrap();
        match outcome {
            UploadOutcome::Renamed(renamed) => {
                assert_eq!(tokio::fs::read(&renamed).await.unwrap(), b"old");
                assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"new");
            }
            other => panic!("expected Renamed, got {other:?}"),
        }
    }
}
