//! API error types for songbook-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use songbook_common::db::Song;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Credential check failed (401)
    #[error("Invalid credentials")]
    Unauthorized,

    /// Near-duplicate titles found (409); creation withheld until the
    /// caller re-submits with the override flag
    #[error("Duplicate title: {} existing song(s) match", .0.len())]
    Duplicate(Vec<Song>),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// songbook-common error
    #[error("Common error: {0}")]
    Common(#[from] songbook_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            // Duplicate carries a payload the UI needs for its confirm dialog
            ApiError::Duplicate(duplicates) => {
                let body = Json(json!({
                    "error": {
                        "code": "DUPLICATE_TITLE",
                        "message": format!(
                            "{} existing song(s) have a similar title",
                            duplicates.len()
                        ),
                    },
                    "duplicates": duplicates,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
