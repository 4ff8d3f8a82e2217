//! Update handler: `PATCH /posts/{id}`

use axum::extract::State;
use esposts_persistence::core::PostRepository;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::{PostBody, PostId};
use crate::responses::Envelope;
use crate::state::AppState;
use crate::types::PostPayload;

/// Handler for updating a post.
///
/// Fields present in the body replace the stored ones; `updated` is stamped
/// with the current time.
///
/// # HTTP Request
///
/// `PATCH /posts/{id}`
///
/// # Response
///
/// - `200 OK` - post updated, returned as a one-element `data` list
/// - `400 Bad Request` - `id` is not a UUID, or invalid JSON
/// - `404 Not Found` - record does not exist (no write was attempted)
/// - `409 Conflict` - the post changed between read and write
pub async fn update_handler<R>(
    State(state): State<AppState<R>>,
    PostId(id): PostId,
    PostBody(input): PostBody,
) -> RestResult<Envelope<Vec<PostPayload>>>
where
    R: PostRepository + 'static,
{
    debug!(%id, "Processing update request");

    let post = state.service().update_post(id, input).await?;

    Ok(Envelope::success(vec![post], "Post updated"))
}
