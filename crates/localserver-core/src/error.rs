//! Shared error type across localserver crates.

use thiserror::Error;

use crate::http::StatusCode;

/// Shared result type.
pub type Result<T> = std::result::Result<T, LocalServerError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum LocalServerError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found")]
    NotFound,
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LocalServerError {
    /// Map the error to the HTTP status a client should see.
    pub fn status(&self) -> StatusCode {
        match self {
            LocalServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LocalServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            LocalServerError::NotFound => StatusCode::NOT_FOUND,
            LocalServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LocalServerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            LocalServerError::UnsupportedVersion => StatusCode::BAD_REQUEST,
            LocalServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
