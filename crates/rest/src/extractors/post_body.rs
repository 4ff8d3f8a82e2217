//! Post input body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::StatusCode,
};

use crate::error::RestError;
use crate::types::PostInput;

/// Axum extractor for a [`PostInput`] JSON body.
///
/// An empty body is an input with no fields set. Anything else must be a JSON
/// object with only `title` and `done`.
#[derive(Debug, Clone, Default)]
pub struct PostBody(pub PostInput);

impl PostBody {
    /// Consumes the extractor and returns the input.
    pub fn into_inner(self) -> PostInput {
        self.0
    }
}

impl<S> FromRequest<S> for PostBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        parse_post_input(&bytes).map(PostBody)
    }
}

fn body_rejection(rejection: BytesRejection) -> RestError {
    let message = rejection.body_text();
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RestError::PayloadTooLarge { message }
    } else {
        RestError::BadRequest { message }
    }
}

/// Parses a request body into an input.
pub(crate) fn parse_post_input(bytes: &[u8]) -> Result<PostInput, RestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(PostInput::default());
    }
    Ok(serde_json::from_slice(bytes)?)
}
