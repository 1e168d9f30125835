pub mod hijack;
pub mod registration;

use crate::config::RelayConfig;
use axum::Router;
use std::time::Duration;

/// Dial, register and serve the relay connection forever, reconnecting
/// with jitter whenever the connection drops. Mirrors `fs.go`'s top-level
/// `for { ... contactPfe() ... time.Sleep(...) }` loop; the sleep numbers
/// come from spec.md (2000ms + uniform[0, 2000)), which supersede the
/// original Go constants.
pub async fn run_forever(config: RelayConfig, local_addr: String, router: Router) {
    loop {
        tracing::info!(host = %config.host, port = config.port, "connecting to relay");
        match registration::connect_and_register(&config, &local_addr).await {
            Ok(stream) => {
                tracing::info!("registered with relay, serving connection");
                if let Err(err) = hijack::serve_http2(stream, router.clone()).await {
                    tracing::warn!(error = %err, "relay connection ended");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "relay registration failed");
            }
        }

        let jitter_ms = fastrand::u64(0..2000);
        let backoff = Duration::from_millis(2000 + jitter_ms);
        tracing::info!(backoff_ms = backoff.as_millis() as u64, "reconnecting after backoff");
        tokio::time::sleep(backoff).await;
    }
}

/// Mirrors `hda_info.go`'s `"<os>-<arch>-<ncpu>"` arch string, used in the
/// `/md` metadata response.
pub fn arch_string() -> String {
    format!(
        "{}-{}-{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    )
}
