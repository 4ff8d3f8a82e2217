//! Error types for the posts REST API.
//!
//! This module defines all error types used throughout the REST API layer,
//! with automatic conversion to the response envelope.
//!
//! # Error Mapping
//!
//! Storage errors from the persistence layer are automatically mapped to
//! appropriate HTTP status codes:
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | BadRequest | 400 |
//! | PayloadTooLarge | 413 |
//! | NotFound | 404 |
//! | RecordDoesNotExist | 404 |
//! | PreconditionFailed | 409 |
//! | BackendUnavailable | 503 |
//! | GatewayTimeout | 504 |
//! | BadGateway (backend rejection, malformed response, decode failure) | 502 |
//! | InternalError | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use esposts_persistence::error::{ErrorKind, StorageError};
use std::fmt;
use uuid::Uuid;

use crate::responses::Envelope;

/// The primary error type for REST API operations.
///
/// This enum provides semantic error types that map cleanly to HTTP status codes.
#[derive(Debug)]
pub enum RestError {
    /// Invalid input: bad path id or request body (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Request body exceeds the configured limit (HTTP 413).
    PayloadTooLarge {
        /// Error message.
        message: String,
    },

    /// The store has no post with this id (HTTP 404).
    NotFound {
        /// Error message from the store layer.
        message: String,
    },

    /// Update target vanished before the write (HTTP 404).
    RecordDoesNotExist {
        /// The post id.
        id: Uuid,
    },

    /// Conditional write lost a race with another writer (HTTP 409).
    PreconditionFailed {
        /// Message describing the conflict.
        message: String,
    },

    /// The store could not be reached (HTTP 503).
    BackendUnavailable {
        /// Error message.
        message: String,
    },

    /// The store did not answer in time (HTTP 504).
    GatewayTimeout {
        /// Error message.
        message: String,
    },

    /// The store answered with something unusable (HTTP 502).
    BadGateway {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::PayloadTooLarge { message } => write!(f, "Payload too large: {}", message),
            RestError::NotFound { message } => write!(f, "Not found: {}", message),
            RestError::RecordDoesNotExist { id } => write!(f, "record does not exist: {}", id),
            RestError::PreconditionFailed { message } => {
                write!(f, "Precondition failed: {}", message)
            }
            RestError::BackendUnavailable { message } => {
                write!(f, "Backend unavailable: {}", message)
            }
            RestError::GatewayTimeout { message } => write!(f, "Backend timeout: {}", message),
            RestError::BadGateway { message } => write!(f, "Backend error: {}", message),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RestError::NotFound { .. } | RestError::RecordDoesNotExist { .. } => {
                StatusCode::NOT_FOUND
            }
            RestError::PreconditionFailed { .. } => StatusCode::CONFLICT,
            RestError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RestError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Envelope::failure(self.to_string())).into_response()
    }
}

// Implement conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::Timeout { .. } => return RestError::GatewayTimeout { message },
            StorageError::Serialization { .. } => return RestError::InternalError { message },
            _ => {}
        }
        match err.kind() {
            ErrorKind::NotFound => RestError::NotFound { message },
            ErrorKind::PreconditionFailed => RestError::PreconditionFailed { message },
            ErrorKind::BackendUnavailable => RestError::BackendUnavailable { message },
            ErrorKind::Backend | ErrorKind::DecodeFailure => RestError::BadGateway { message },
            ErrorKind::Internal => RestError::InternalError { message },
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;
