use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use domus_sync_core::sync::SyncError;

/// API error type mapped to structured JSON error responses.
///
/// Per the invocation contract every failure is a 500; the body carries the
/// failing stage and page so the caller can diagnose before re-invoking.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_type = match &self {
            ApiError::Config(_) => "configurationError",
            ApiError::Sync(SyncError::Fetch { .. }) => "fetchError",
            ApiError::Sync(SyncError::Extract { .. }) => "extractionError",
            ApiError::Sync(SyncError::Store { .. }) => "databaseError",
            ApiError::Internal(_) => "internalError",
        };
        let message = self.to_string();
        tracing::error!(error_type, "sync run failed: {message}");

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
