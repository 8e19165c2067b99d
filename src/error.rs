//! Error types for the schedule service.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("window name not defined")]
    UnnamedWindow,

    #[error("window({name}): invalid format specified: {format}")]
    InvalidFormat { name: String, format: i16 },

    #[error("window({name}): error processing schedule {expr:?}: {reason}")]
    InvalidSchedule {
        name: String,
        expr: String,
        reason: String,
    },

    #[error("window({name}): window must have minimum of one label")]
    NoLabels { name: String },

    #[error("window({name}): invalid duration {value:?}: {reason}")]
    InvalidDuration {
        name: String,
        value: String,
        reason: String,
    },

    #[error("received empty path to test")]
    EmptyPath,

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("file is not JSON: {}", .0.display())]
    NotJson(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("active hours: {0}")]
    ActiveHours(String),

    #[error("service not available")]
    ServiceUnavailable,

    #[error("schedule request failed for url {url} ({status})")]
    UnexpectedStatus { url: String, status: u16 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
