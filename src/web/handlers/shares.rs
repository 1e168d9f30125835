use crate::web::middleware::AuthContext;
use crate::web::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use serde_json::Value;

/// Mirrors `service.go::serveShares`: admins (no token) see the full
/// catalog; regular users see only the shares they hold a capability grant
/// on. Demo mode's `UserDirectory` grants every share to everyone, so this
/// collapses to the full catalog there too.
pub async fn list(State(state): State<AppState>, Extension(ctx): Extension<AuthContext>) -> Json<Value> {
    if ctx.is_admin {
        return Json(state.shares.to_json().await);
    }

    let all = state.shares.all().await;
    let mut visible = Vec::new();
    for share in all {
        if state.sessions.has_read_access(ctx.user_id, share.id).await {
            visible.push(share);
        }
    }
    Json(serde_json::to_value(visible.iter().map(|s| s.to_json()).collect::<Vec<_>>()).unwrap_or(Value::Null))
}
