pub mod audio_artwork;
pub mod image_thumb;
pub mod watcher;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cache directory name, hidden and excluded from every walk/listing, per
/// `cache.go`'s `.fscache` convention.
const CACHE_DIR_NAME: &str = ".fscache";
const THUMBNAILS_SUBDIR: &str = "thumbnails";

/// Mirrors `cache.go`'s sidecar path convention:
/// `<parent>/.fscache/thumbnails/<basename>`.
pub fn cache_path_for(source: &Path) -> Option<PathBuf> {
    let parent = source.parent()?;
    let name = source.file_name()?;
    Some(parent.join(CACHE_DIR_NAME).join(THUMBNAILS_SUBDIR).join(name))
}

pub fn is_inside_cache_dir(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == CACHE_DIR_NAME)
}

/// Mirrors `cache.go::walkFunc`: regenerate if the thumbnail is missing or
/// older than its source.
pub fn needs_regeneration(source_mtime: SystemTime, thumb_path: &Path) -> bool {
    match std::fs::metadata(thumb_path) {
        Ok(meta) => match meta.modified() {
            Ok(thumb_mtime) => thumb_mtime < source_mtime,
            Err(_) => true,
        },
        Err(_) => true,
    }
}

/// Unifies the startup cache walk and the reactive filesystem-event
/// handler around one regeneration predicate, so both code paths agree on
/// when a thumbnail is stale.
pub struct CacheManager;

impl CacheManager {
    /// Regenerates (or removes) the cache sidecar for a single source path,
    /// dispatching on whether it's audio (embedded artwork) or another
    /// media file (image thumbnail). Anything under `.fscache` itself is
    /// ignored to avoid feedback loops.
    pub async fn fill(source: &Path) -> anyhow::Result<()> {
        if is_inside_cache_dir(source) {
            return Ok(());
        }
        let Some(dest) = cache_path_for(source) else {
            return Ok(());
        };

        let metadata = match tokio::fs::metadata(source).await {
            Ok(m) => m,
            Err(_) => return Ok(()), // source vanished between event and handling
        };
        if metadata.is_dir() {
            return Ok(());
        }
        let mtime = metadata.modified().unwrap_or(SystemTime::now());
        if !needs_regeneration(mtime, &dest) {
            return Ok(());
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if audio_artwork::is_audio(source) {
            if let Some(picture) = audio_artwork::extract_embedded_picture(source).await? {
                tokio::fs::write(&dest, picture).await?;
            }
        } else {
            image_thumb::generate_thumbnail(source, &dest).await?;
        }

        Ok(())
    }

    pub async fn remove(source: &Path) -> anyhow::Result<()> {
        if let Some(dest) = cache_path_for(source) {
            let _ = tokio::fs::remove_file(dest).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_nests_under_fscache_thumbnails() {
        let path = Path::new("/srv/movies/poster.jpg");
        let cache = cache_path_for(path).unwrap();
        assert_eq!(cache, PathBuf::from("/srv/movies/.fscache/thumbnails/poster.jpg"));
    }

    #[test]
    fn cache_dir_contents_are_recognized_as_such() {
        assert!(is_inside_cache_dir(Path::new("/srv/movies/.fscache/thumbnails/x.jpg")));
        assert!(!is_inside_cache_dir(Path::new("/srv/movies/poster.jpg")));
    }
}
