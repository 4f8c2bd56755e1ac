use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error.
    #[error("Book not found")]
    NotFound,

    /// Invalid or missing request data.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credentials.
    #[error("Invalid or missing token")]
    Unauthorized,

    /// Duplicate record.
    #[error("{0}")]
    Conflict(String),

    /// Rejected cover upload.
    #[error("Upload error: {0}")]
    Upload(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request error");
            "Server error".to_string()
        } else {
            tracing::debug!(error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
