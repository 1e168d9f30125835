use super::content_type::content_type_for;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub mtime: String,
}

/// Mirrors `file_info.go::directoryFileInfos`/`dirToJSON`: dotfiles are
/// skipped, directories (and symlinks that resolve to directories) are
/// reported as zero-size `text/directory` entries, and the listing is
/// sorted case-insensitively by name.
pub async fn directory_listing(dir: &Path) -> std::io::Result<Vec<DirectoryEntry>> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let metadata = std::fs::metadata(entry.path())?;
            let mtime: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            if metadata.is_dir() {
                entries.push(DirectoryEntry {
                    name,
                    content_type: "text/directory".to_string(),
                    size: 0,
                    mtime: mtime.to_rfc2822(),
                });
            } else {
                entries.push(DirectoryEntry {
                    name,
                    content_type: content_type_for(&entry.path()).to_string(),
                    size: metadata.len(),
                    mtime: mtime.to_rfc2822(),
                });
            }
        }

        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(entries)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_skips_dotfiles_and_sorts_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Banana.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("apple.txt"), b"x").unwrap();
        std::fs::write(dir.path().join(".hidden"), b"x").unwrap();

        let entries = directory_listing(dir.path()).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apple.txt", "Banana.txt"]);
    }

    #[tokio::test]
    async fn subdirectories_report_as_text_directory_with_zero_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = directory_listing(dir.path()).await.unwrap();
        assert_eq!(entries[0].content_type, "text/directory");
        assert_eq!(entries[0].size, 0);
    }
}
