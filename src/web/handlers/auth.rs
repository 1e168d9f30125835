use crate::errors::AppError;
use crate::web::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub auth_token: String,
}

/// Mirrors `auth.go::authenticate`: a pin that matches no user is a 401,
/// not a generic error.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = state.sessions.authenticate(&request.pin).await?;
    Ok(Json(AuthResponse { auth_token: token }))
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).to_string())
}

/// Mirrors `auth.go::logout`.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.logout(&token).await;
    }
    Json(json!({ "ok": true }))
}
