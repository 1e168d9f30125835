use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors raised by the backing store (session/share/app lookups).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl RepositoryError {
    pub fn record_not_found() -> Self {
        Self::NotFound
    }

    pub fn constraint_violation(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}

/// Errors raised while serving files, directories or uploads.
#[derive(Debug, thiserror::Error)]
pub enum FileServiceError {
    #[error("path escapes the share")]
    PathEscape,

    #[error("share not found: {0}")]
    ShareNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `restrictCache`: a `/files` (or `/files` delete/upload) request
    /// resolved into the share's `.fscache` sidecar directory.
    #[error("cannot access cache via files")]
    CacheAccessDenied,

    /// An uploaded file's name doesn't resolve to a safe path inside the
    /// destination directory (e.g. it carries `..` components).
    #[error("unsupported filename")]
    UnsupportedFilename,
}

/// Errors raised by the relay connector while registering or serving.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("tls handshake failed: {0}")]
    Tls(String),

    #[error("registration rejected by relay, status {0}")]
    RegistrationRejected(u16),

    #[error("relay response malformed: {0}")]
    Malformed(String),
}

/// The single error type returned by axum handlers, mapped to the status
/// codes the relay and local clients expect.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication failed")]
    AuthFailed,

    #[error("permission denied")]
    PermissionDenied,

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("precondition failed")]
    PreconditionFailed,

    #[error("action disabled")]
    Disabled,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    FileService(#[from] FileServiceError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::AuthFailed => (StatusCode::UNAUTHORIZED, "Authentication Failed".to_string()),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "Permission Denied".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PreconditionFailed => {
                (StatusCode::EXPECTATION_FAILED, "Precondition Failed".to_string())
            }
            AppError::Disabled => (StatusCode::NOT_FOUND, "Disabled".to_string()),
            AppError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            AppError::Repository(err) => {
                tracing::error!(error = %err, "repository error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".to_string())
            }
            AppError::FileService(FileServiceError::PathEscape) => {
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            AppError::FileService(FileServiceError::ShareNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            AppError::FileService(FileServiceError::CacheAccessDenied) => {
                (StatusCode::FORBIDDEN, "Cannot access cache via /files".to_string())
            }
            AppError::FileService(FileServiceError::UnsupportedFilename) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Filename".to_string())
            }
            AppError::FileService(err) => {
                tracing::error!(error = %err, "file service error");
                (StatusCode::EXPECTATION_FAILED, "Error".to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".to_string())
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
