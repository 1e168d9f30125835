use super::CacheManager;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

/// Walks a share tree on startup, regenerating any stale/missing thumbnail
/// sidecars. Mirrors `hda_shares.go::createThumbnailCache`'s initial
/// `fillCache` pass, skipping anything under `.fscache`.
pub async fn warm_cache(root: &Path) {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "cache warm: could not read directory");
                continue;
            }
        };

        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let path = entry.path();
            if super::is_inside_cache_dir(&path) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => stack.push(path),
                Ok(_) => {
                    if let Err(err) = CacheManager::fill(&path).await {
                        tracing::warn!(path = %path.display(), error = %err, "cache warm: thumbnail generation failed");
                    }
                }
                Err(_) => continue,
            }
        }
    }
}

/// Watches a share tree for changes and keeps the thumbnail cache in sync.
/// Mirrors `hda_shares.go::createThumbnailCache`'s fsnotify loop:
/// create/write regenerates, remove/rename clears the sidecar.
pub async fn watch(root: &Path) -> notify::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        for path in event.paths {
            match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) => {
                    if let Err(err) = CacheManager::fill(&path).await {
                        tracing::warn!(path = %path.display(), error = %err, "cache update failed");
                    }
                }
                EventKind::Remove(_) => {
                    if let Err(err) = CacheManager::remove(&path).await {
                        tracing::warn!(path = %path.display(), error = %err, "cache removal failed");
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
