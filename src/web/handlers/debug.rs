use crate::relay::arch_string;
use crate::web::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::json;

/// Mirrors `debug_info.go::everything`: running counters plus the agent
/// info record (version, local/relay address, arch).
pub async fn get_debug(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.debug.snapshot().await;
    let outstanding = snapshot
        .num_requests_received
        .saturating_sub(snapshot.num_requests_served);
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "local_addr": state.local_addr,
        "relay_addr": format!("{}:{}", state.config.relay.host, state.config.relay.port),
        "arch": arch_string(),
        "started_at": state.started_at.to_rfc3339(),
        "last_request_at": snapshot.last_request_at.map(|t| t.to_rfc3339()),
        "num_requests_received": snapshot.num_requests_received,
        "num_requests_served": snapshot.num_requests_served,
        "bytes_served": snapshot.bytes_served,
        "outstanding": outstanding,
    }))
}
