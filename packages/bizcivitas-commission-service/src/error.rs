//! Error types for the commission service.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bizcivitas_commission::CommissionError;
use std::fmt;

/// Service error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Fetching or decoding policies from the backend failed.
    PolicySource(String),
    /// Rejected calculation input.
    Commission(CommissionError),
    /// Unknown plan component or similar lookup miss.
    NotFound(String),
    /// Request body that is not the expected JSON. Keeps the extractor's
    /// status: 400 for syntax, 415 for content type, 422 for shape.
    InvalidBody { status: StatusCode, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::PolicySource(msg) => write!(f, "policy source error: {msg}"),
            Error::Commission(err) => write!(f, "{err}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::InvalidBody { message, .. } => write!(f, "invalid request body: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<CommissionError> for Error {
    fn from(err: CommissionError) -> Self {
        Error::Commission(err)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PolicySource(_) => StatusCode::BAD_GATEWAY,
            Error::Commission(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidBody { status, .. } => *status,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
