use crate::web::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

/// Mirrors `service.go::appsList`.
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    Json(state.apps.to_json().await)
}
