use crate::errors::AppError;
use crate::utils::logs as log_utils;
use crate::web::AppState;
use axum::extract::{Query, State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// A line count, or the literal `"all"` for the full file. Mirrors
    /// `service.go::serveLogs`'s `mode` query parameter.
    #[serde(default)]
    pub mode: Option<String>,
}

pub async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<String, AppError> {
    let mode = query.mode.unwrap_or_else(|| "100".to_string());

    let body = if mode == "all" {
        log_utils::read_all(&state.log_path).await
    } else {
        let n: usize = mode.parse().unwrap_or(100);
        log_utils::tail_lines(&state.log_path, n).await
    };

    body.map_err(|e| AppError::bad_request(format!("could not read log file: {e}")))
}
