use async_trait::async_trait;
use serde::Serialize;

/// Seam for the external media-metadata library the relay's `/md` endpoint
/// defers to. The library itself is an external collaborator (out of
/// scope); this trait is the boundary an implementation would plug into.
#[async_trait]
pub trait MediaMetadataLookup: Send + Sync {
    async fn lookup(&self, filename: &str, hash: &str) -> Option<MediaMetadata>;
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaMetadata {
    pub title: String,
    pub kind: String,
}

/// No metadata library wired in; every lookup misses. Keeps `/md` a real,
/// reachable endpoint with the documented query contract even though the
/// backing library is out of scope.
pub struct StubMetadataLookup;

#[async_trait]
impl MediaMetadataLookup for StubMetadataLookup {
    async fn lookup(&self, _filename: &str, _hash: &str) -> Option<MediaMetadata> {
        None
    }
}
