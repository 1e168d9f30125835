use sha1::{Digest, Sha1};
use std::time::SystemTime;

/// Mirrors `shasum.go`'s `sha1bytes`: ETag for a directory listing body.
pub fn etag_for_bytes(body: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Mirrors `service.go::serveFile`'s `sha1string(path + mtime)`: ETag for a
/// regular file, cheap to recompute without reading the file's contents.
pub fn etag_for_file(path: &str, mtime: SystemTime) -> String {
    let since_epoch = mtime
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let key = format!("{path}{}", since_epoch.as_nanos());
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_produces_same_etag() {
        assert_eq!(etag_for_bytes(b"hello"), etag_for_bytes(b"hello"));
        assert_ne!(etag_for_bytes(b"hello"), etag_for_bytes(b"world"));
    }

    #[test]
    fn file_etag_changes_with_mtime() {
        let t1 = SystemTime::UNIX_EPOCH;
        let t2 = t1 + std::time::Duration::from_secs(1);
        assert_ne!(etag_for_file("/a/b", t1), etag_for_file("/a/b", t2));
    }
}
