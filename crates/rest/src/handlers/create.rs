//! Create handler: `POST /posts`

use axum::extract::State;
use esposts_persistence::core::PostRepository;
use tracing::{debug, info};

use crate::error::RestResult;
use crate::extractors::PostBody;
use crate::responses::Envelope;
use crate::state::AppState;
use crate::types::PostPayload;

/// Handler for creating a post.
///
/// The server assigns the id and creation time; the body supplies `title`
/// (required) and optionally `done`.
///
/// # HTTP Request
///
/// `POST /posts`
///
/// # Response
///
/// - `200 OK` - post created, returned as a one-element `data` list
/// - `400 Bad Request` - invalid JSON or missing title
///
/// # Example
///
/// ```http
/// POST /posts HTTP/1.1
/// Content-Type: application/json
///
/// {"title": "write docs"}
/// ```
pub async fn create_handler<R>(
    State(state): State<AppState<R>>,
    PostBody(input): PostBody,
) -> RestResult<Envelope<Vec<PostPayload>>>
where
    R: PostRepository + 'static,
{
    debug!("Processing create request");

    let post = state.service().add_post(input).await?;

    info!(id = %post.id, "Post created");
    Ok(Envelope::success(vec![post], "Post added"))
}
