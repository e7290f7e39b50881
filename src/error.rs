use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::data::StorageError;
use crate::runner::RunnerError;

/// Route-boundary error. Everything a handler can fail with converges here
/// and becomes a JSON `{error, details?}` body; nothing escapes to crash the
/// process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Upstream {
        message: String,
        details: String,
    },
    #[error("{0}")]
    Storage(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => ApiError::Conflict(err.to_string()),
            StorageError::Database(_) => ApiError::Storage(err.to_string()),
        }
    }
}

impl From<RunnerError> for ApiError {
    fn from(err: RunnerError) -> Self {
        // Both runner failures are client errors under the command-only
        // design.
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            ApiError::Upstream { message, details } => {
                tracing::error!("upstream failure: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            ApiError::Storage(message) => {
                tracing::error!("storage failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
