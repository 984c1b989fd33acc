use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use subhub_shared::{FileId, IdError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Subscription not found: {0}")]
    NotFound(FileId),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content too large: {size} bytes (max {max})")]
    ContentTooLarge { size: usize, max: usize },

    #[error("Invalid subscription ID: {0}")]
    InvalidId(#[from] IdError),

    #[error("Path traversal detected")]
    PathTraversal,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Unknown and malformed IDs look the same to the caller.
            ServerError::NotFound(_) | ServerError::InvalidId(_) => {
                return (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "subscription not found",
                )
                    .into_response();
            }
            ServerError::EmptyContent | ServerError::PathTraversal => StatusCode::BAD_REQUEST,
            ServerError::ContentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ServerError::Storage(_) => "Storage error".to_string(),
            other => other.to_string(),
        };

        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}
