use crate::web::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    #[serde(default, rename = "f")]
    pub filename: String,
    #[serde(default, rename = "h")]
    pub hash: String,
}

/// `GET /md?f=&h=` — fetch external media metadata through the metadata
/// library, keyed by filename and content hash.
pub async fn get_metadata(
    State(state): State<AppState>,
    Query(query): Query<MetadataQuery>,
) -> Response {
    match state.metadata.lookup(&query.filename, &query.hash).await {
        Some(meta) => Json(json!({ "title": meta.title, "kind": meta.kind })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
