use lofty::TaggedFileExt;
use std::path::Path;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg", "wav", "opus"];

pub fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extracts the first embedded picture (front cover, if tagged as such,
/// otherwise whatever's first) from an audio file's tags. Returns `None`
/// rather than an error when the file simply has no artwork — that's the
/// common case, not a failure.
pub async fn extract_embedded_picture(source: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    let source = source.to_path_buf();
    tokio::task::spawn_blocking(move || -> anyhow::Result<Option<Vec<u8>>> {
        let tagged_file = match lofty::read_from_path(&source) {
            Ok(f) => f,
            Err(_) => return Ok(None),
        };

        let picture = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .and_then(|tag| tag.pictures().first())
            .map(|pic| pic.data().to_vec());

        Ok(picture)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_audio_extensions() {
        assert!(is_audio(Path::new("song.mp3")));
        assert!(is_audio(Path::new("song.flac")));
        assert!(!is_audio(Path::new("movie.mkv")));
    }
}
