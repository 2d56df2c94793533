//! Error types for the lookup service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the lookup service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Outbound request could not be completed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Persisted state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The submission path is switched off in settings
    #[error("Disabled: {0}")]
    Disabled(String),

    /// A queued lookup was withdrawn before it ran
    #[error("Lookup cancelled: {0}")]
    Cancelled(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Disabled(_) => StatusCode::FORBIDDEN,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the lookup service.
pub type Result<T> = std::result::Result<T, AppError>;
