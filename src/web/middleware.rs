use super::AppState;
use crate::errors::AppError;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use regex::Regex;
use std::sync::OnceLock;

/// Identity attached to a request by [`auth_middleware`]. Absent token
/// means admin access, mirroring `auth.go::isAdmin`'s "no token = admin"
/// rule.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub login: String,
    pub is_admin: bool,
}

/// Mirrors `auth.go::parseAuthToken`: the token comes from the
/// `Authorization` header or the `?auth=` query parameter.
fn parse_auth_token(headers: &HeaderMap, query: &str) -> Option<String> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(s) = value.to_str() {
            let token = s.strip_prefix("Bearer ").unwrap_or(s);
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("auth=") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Resolves the caller's identity and stores it in request extensions.
/// Mirrors `auth.go::authMiddleware`/`checkAuthHeader`: a present-but-stale
/// or unknown token is rejected, a missing token grants admin access.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let query = req.uri().query().unwrap_or("").to_string();
    let token = parse_auth_token(req.headers(), &query);

    let context = match token {
        None => AuthContext {
            user_id: 0,
            login: "admin".to_string(),
            is_admin: true,
        },
        Some(token) => {
            let session = state.sessions.lookup(&token).await.ok_or(AppError::AuthFailed)?;
            AuthContext {
                user_id: session.user_id,
                login: session.login,
                is_admin: false,
            }
        }
    };

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Mirrors `auth.go::shareReadAccess`: admins (no token) always pass;
/// everyone else needs an explicit read grant on the named share.
pub async fn require_read_access(
    state: &AppState,
    context: &AuthContext,
    share_id: i64,
) -> Result<(), AppError> {
    if context.is_admin {
        return Ok(());
    }
    if state.sessions.has_read_access(context.user_id, share_id).await {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Mirrors `auth.go::shareWriteAccess`.
pub async fn require_write_access(
    state: &AppState,
    context: &AuthContext,
    share_id: i64,
) -> Result<(), AppError> {
    if context.is_admin {
        return Ok(());
    }
    if state.sessions.has_write_access(context.user_id, share_id).await {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Every response varies on the session token; reverse-proxied app
/// responses additionally vary on `User-Agent` (that's how the vhost tag
/// selects the backend) — `vhost_filter`/`proxy::forward` set that half,
/// this appends `Session` to whatever is already there.
pub async fn add_vary_session(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let existing = response
        .headers()
        .get(axum::http::header::VARY)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let combined = match existing {
        Some(value) if !value.is_empty() => format!("{value}, Session"),
        _ => "Session".to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&combined) {
        response.headers_mut().insert(axum::http::header::VARY, value);
    }
    response
}

static VHOST_TAG: OnceLock<Regex> = OnceLock::new();

fn vhost_tag_regex() -> &'static Regex {
    VHOST_TAG.get_or_init(|| Regex::new(r"Vhost/(\S*)").unwrap())
}

/// Mirrors `service.go::topVhostFilter`: a `Vhost/<name>` tag in the
/// `User-Agent` means the relay is forwarding browser traffic meant for a
/// locally registered web app, reverse-proxied to its local port. Anything
/// else — an empty UA (the relay's own API calls) or an ordinary browser
/// UA with no vhost tag — falls through to the regular API router.
pub async fn vhost_filter(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let user_agent = req
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Empty UA (the relay's own API calls) and any ordinary browser UA with
    // no vhost tag both fall through to the regular API router; only a
    // recognized `Vhost/<name>` tag for an unknown app is a 404 here.
    let Some(captures) = vhost_tag_regex().captures(&user_agent) else {
        return next.run(req).await;
    };
    let vhost = captures.get(1).map(|m| m.as_str()).unwrap_or("");

    match state.apps.find_by_vhost(vhost).await {
        Some(app) => {
            let mut response = super::handlers::proxy::forward(app, req).await;
            response
                .headers_mut()
                .insert(axum::http::header::VARY, HeaderValue::from_static("User-Agent"));
            response
        }
        None => AppError::NotFound.into_response(),
    }
}
