use crate::errors::{AppError, FileServiceError};
use crate::files::{self, UploadOutcome};
use crate::thumbnails;
use crate::utils::etag_for_file;
use crate::web::middleware::{require_read_access, require_write_access, AuthContext};
use crate::web::AppState;
use axum::body::Body;
use axum::extract::{Extension, Multipart, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub share: String,
    #[serde(default)]
    pub path: String,
}

async fn resolve_share(
    state: &AppState,
    name: &str,
) -> Result<std::sync::Arc<crate::catalog::shares::Share>, AppError> {
    state
        .shares
        .get(name)
        .await
        .ok_or_else(|| FileServiceError::ShareNotFound(name.to_string()).into())
}

/// Mirrors `service.go::serveFile`: directories (and symlinked directories)
/// become a JSON listing, everything else is served with conditional GET
/// and range support.
pub async fn get_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let share = resolve_share(&state, &query.share).await?;
    require_read_access(&state, &ctx, share.id).await?;

    if state.config.features.no_browse && query.path.is_empty() {
        return Err(AppError::Disabled);
    }

    if thumbnails::is_inside_cache_dir(Path::new(&query.path)) {
        return Err(FileServiceError::CacheAccessDenied.into());
    }
    let target = files::resolve_within_share(&share.path, &query.path)?;
    let metadata = tokio::fs::metadata(&target)
        .await
        .map_err(|_| AppError::not_found())?;

    state.debug.request_received().await;

    if metadata.is_dir() {
        return serve_directory(&target).await;
    }

    serve_file(&target, &metadata, &headers, &state).await
}

async fn serve_directory(dir: &Path) -> Result<Response, AppError> {
    let entries = files::directory_listing(dir)
        .await
        .map_err(FileServiceError::Io)?;
    let body = serde_json::to_vec(&entries).map_err(|e| AppError::Internal(e.into()))?;
    let etag = crate::utils::etag_for_bytes(&body);

    let mut response = Json(entries).into_response();
    response
        .headers_mut()
        .insert(header::ETAG, HeaderValue::from_str(&format!("\"{etag}\"")).unwrap());
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

async fn serve_file(
    path: &Path,
    metadata: &std::fs::Metadata,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Response, AppError> {
    let mtime = metadata.modified().unwrap_or(std::time::SystemTime::now());
    let etag = etag_for_file(&path.to_string_lossy(), mtime);
    let quoted_etag = format!("\"{etag}\"");

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH) {
        if if_none_match.to_str().ok() == Some(quoted_etag.as_str()) {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    let content_type = crate::files::content_type_for(path);
    let total_len = metadata.len();

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_range(v, total_len));

    let mut file = tokio::fs::File::open(path).await.map_err(FileServiceError::Io)?;

    let (status, start, len) = match range {
        Some((start, end)) => {
            use tokio::io::AsyncSeekExt;
            file.seek(std::io::SeekFrom::Start(start))
                .await
                .map_err(FileServiceError::Io)?;
            (StatusCode::PARTIAL_CONTENT, start, end - start + 1)
        }
        None => (StatusCode::OK, 0, total_len),
    };

    let stream = ReaderStream::new(file.take(len));
    let body = Body::from_stream(stream);

    state.debug.request_served(len).await;

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::ETAG, quoted_etag)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| AppError::Internal(e.into()))?;

    if status == StatusCode::PARTIAL_CONTENT {
        response.headers_mut().insert(
            header::CONTENT_RANGE,
            HeaderValue::from_str(&format!("bytes {start}-{}/{total_len}", start + len - 1)).unwrap(),
        );
    }

    Ok(response)
}

/// Parses a single-range `Range: bytes=start-end` header. Multi-range
/// requests fall back to serving the whole file, matching the common
/// (and original Go `http.ServeContent`-delegated) behavior for the
/// overwhelming majority of clients that only ever issue single ranges.
fn parse_range(header: &str, total_len: u64) -> Option<(u64, u64)> {
    let spec = header.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end: u64 = if end.is_empty() {
        total_len.saturating_sub(1)
    } else {
        end.parse().ok()?
    };
    if start > end || end >= total_len {
        return None;
    }
    Some((start, end))
}

/// Mirrors `service.go::serveCache`: the thumbnail/artwork sidecar for a
/// file, with the same conditional-GET contract. 404 if the source isn't
/// a regular file (no thumbnails for directories).
pub async fn get_cache(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let share = resolve_share(&state, &query.share).await?;
    require_read_access(&state, &ctx, share.id).await?;

    let source = files::resolve_within_share(&share.path, &query.path)?;
    let source_meta = tokio::fs::metadata(&source).await.map_err(|_| AppError::not_found())?;
    if source_meta.is_dir() {
        return Err(AppError::not_found());
    }

    let cache_path = thumbnails::cache_path_for(&source).ok_or_else(AppError::not_found)?;
    if !cache_path.starts_with(&share.path) {
        return Err(FileServiceError::PathEscape.into());
    }

    let cache_meta = tokio::fs::metadata(&cache_path).await.map_err(|_| AppError::not_found())?;
    serve_file(&cache_path, &cache_meta, &headers, &state).await
}

/// Mirrors `service.go::deleteFile`. A global `no-delete` mode is a no-op
/// that still answers 200, matching the original's "pretend it worked"
/// contract for a read-only deployment.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<FileQuery>,
) -> Result<StatusCode, AppError> {
    if state.config.features.no_delete {
        return Ok(StatusCode::OK);
    }

    if thumbnails::is_inside_cache_dir(Path::new(&query.path)) {
        return Err(FileServiceError::CacheAccessDenied.into());
    }

    let share = resolve_share(&state, &query.share).await?;
    require_write_access(&state, &ctx, share.id).await?;

    let target = files::resolve_within_share(&share.path, &query.path)?;
    tokio::fs::remove_file(&target).await.map_err(FileServiceError::Io)?;
    thumbnails::CacheManager::remove(&target)
        .await
        .map_err(|e| AppError::Internal(e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mirrors `service.go::uploadFile`: MD5-deduplicated, renaming the
/// existing file aside when the content differs. A global `no-upload`
/// mode is a no-op that still answers 200, matching the original's
/// behavior for a read-only deployment.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<FileQuery>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.config.features.no_upload {
        return Ok(Json(serde_json::json!({ "status": "disabled" })));
    }

    if thumbnails::is_inside_cache_dir(Path::new(&query.path)) {
        return Err(FileServiceError::CacheAccessDenied.into());
    }

    let share = resolve_share(&state, &query.share).await?;
    require_write_access(&state, &ctx, share.id).await?;

    let dest_dir = files::resolve_within_share(&share.path, &query.path)?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
        .ok_or_else(|| AppError::bad_request("missing file field"))?;

    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::bad_request("missing file name"))?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    // Route the untrusted filename through the same sandboxing as every
    // other path so `../../../etc/cron.d/evil` can't escape the share.
    let dest = match files::resolve_within_share(&dest_dir, &file_name) {
        Ok(path) => path,
        Err(FileServiceError::PathEscape) => return Err(FileServiceError::UnsupportedFilename.into()),
        Err(err) => return Err(err.into()),
    };

    let outcome = files::save_upload(&dest, &bytes).await?;
    thumbnails::CacheManager::fill(&dest)
        .await
        .map_err(|e| AppError::Internal(e))?;

    let result = match outcome {
        UploadOutcome::Created => serde_json::json!({ "status": "created" }),
        UploadOutcome::Renamed(old) => {
            serde_json::json!({ "status": "renamed", "previous": old.file_name().map(|n| n.to_string_lossy().to_string()) })
        }
        UploadOutcome::SameMd5 => serde_json::json!({ "status": "unchanged" }),
    };
    Ok(Json(result))
}
