use crate::errors::FileServiceError;
use std::path::{Path, PathBuf};

/// Resolves a client-supplied relative path against a share root, refusing
/// anything that would escape it. Mirrors `service.go::fullPathToFile`'s
/// rejection of `../` in the literal request, strengthened with the
/// canonicalize-and-check-prefix pattern used for upload sandboxing: a
/// symlink inside the share can't be used to escape it either.
pub fn resolve_within_share(share_root: &Path, requested: &str) -> Result<PathBuf, FileServiceError> {
    if requested.contains("..") {
        return Err(FileServiceError::PathEscape);
    }

    let requested = requested.trim_start_matches('/');
    let candidate = share_root.join(requested);

    let canonical_root = share_root
        .canonicalize()
        .map_err(FileServiceError::Io)?;

    let canonical_candidate = if candidate.exists() {
        candidate.canonicalize().map_err(FileServiceError::Io)?
    } else {
        // Target doesn't exist yet (e.g. an upload destination): canonicalize
        // the parent and rejoin the final component instead.
        let parent = candidate
            .parent()
            .ok_or(FileServiceError::PathEscape)?
            .canonicalize()
            .map_err(FileServiceError::Io)?;
        let file_name = candidate.file_name().ok_or(FileServiceError::PathEscape)?;
        parent.join(file_name)
    };

    if !canonical_candidate.starts_with(&canonical_root) {
        return Err(FileServiceError::PathEscape);
    }

    Ok(canonical_candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dotdot_in_request() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_within_share(dir.path(), "../etc/passwd").unwrap_err();
        assert!(matches!(err, FileServiceError::PathEscape));
    }

    #[test]
    fn resolves_an_existing_file_inside_the_share() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movie.mkv"), b"x").unwrap();
        let resolved = resolve_within_share(dir.path(), "movie.mkv").unwrap();
        assert!(resolved.ends_with("movie.mkv"));
    }

    #[test]
    fn resolves_a_not_yet_existing_upload_destination() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_within_share(dir.path(), "new.txt").unwrap();
        assert!(resolved.ends_with("new.txt"));
    }
}
