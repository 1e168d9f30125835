use std::path::Path;

/// Extension-to-MIME table mirroring `file_info.go::getContentType`,
/// including the subtitle extensions the standard library's sniffing
/// wouldn't recognize.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        // subtitle formats all collapse onto the same original MIME type
        "srt" | "sub" | "ssa" | "ass" | "idx" | "smi" | "vtt" => "application/x-subtitle",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn subtitle_extensions_share_one_mime_type() {
        for ext in ["srt", "sub", "ssa", "ass", "vtt"] {
            let path = PathBuf::from(format!("movie.{ext}"));
            assert_eq!(content_type_for(&path), "application/x-subtitle");
        }
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let path = PathBuf::from("movie.xyz123");
        assert_eq!(content_type_for(&path), "application/octet-stream");
    }
}
