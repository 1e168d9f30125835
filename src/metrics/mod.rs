use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// Mirrors `debug_info.go`: a handful of running counters exposed at
/// `/hda_debug`, guarded by a single lock, never held across I/O.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub last_request_at: Option<DateTime<Utc>>,
    pub num_requests_received: u64,
    pub num_requests_served: u64,
    pub bytes_served: u64,
}

#[derive(Default)]
struct Inner {
    last_request_at: Option<DateTime<Utc>>,
    num_requests_received: u64,
    num_requests_served: u64,
    bytes_served: u64,
}

#[derive(Default)]
pub struct DebugCounters {
    inner: RwLock<Inner>,
}

impl DebugCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn request_received(&self) {
        let mut inner = self.inner.write().await;
        inner.num_requests_received += 1;
        inner.last_request_at = Some(Utc::now());
    }

    pub async fn request_served(&self, bytes: u64) {
        let mut inner = self.inner.write().await;
        inner.num_requests_served += 1;
        inner.bytes_served += bytes;
    }

    pub async fn snapshot(&self) -> DebugSnapshot {
        let inner = self.inner.read().await;
        DebugSnapshot {
            last_request_at: inner.last_request_at,
            num_requests_received: inner.num_requests_received,
            num_requests_served: inner.num_requests_served,
            bytes_served: inner.bytes_served,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_accumulate() {
        let counters = DebugCounters::new();
        counters.request_received().await;
        counters.request_received().await;
        counters.request_served(128).await;

        let snapshot = counters.snapshot().await;
        assert_eq!(snapshot.num_requests_received, 2);
        assert_eq!(snapshot.num_requests_served, 1);
        assert_eq!(snapshot.bytes_served, 128);
    }
}
