//! The uniform response envelope.
//!
//! Every response body, success or failure, has the same shape:
//!
//! ```json
//! { "data": [...], "message": "Posts fetched", "errors": [] }
//! ```
//!
//! On failure `data` is `null`, `message` is a fixed marker and `errors`
//! holds exactly one message.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message carried by every failure envelope.
pub const FAILURE_MESSAGE: &str = "error occurred";

/// Response envelope `{data, message, errors}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Payload, `null` on failure.
    pub data: Option<T>,
    /// Human-readable outcome.
    pub message: String,
    /// Empty on success, one message on failure.
    pub errors: Vec<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Creates a success envelope.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl Envelope<()> {
    /// Creates a failure envelope carrying one error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            data: None,
            message: FAILURE_MESSAGE.to_string(),
            errors: vec![error.into()],
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
