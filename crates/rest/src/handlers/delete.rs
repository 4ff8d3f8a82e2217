//! Delete handler: `DELETE /posts/{id}`

use axum::extract::State;
use esposts_persistence::core::PostRepository;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::PostId;
use crate::responses::Envelope;
use crate::state::AppState;
use crate::types::PostPayload;

/// Handler for deleting a post.
///
/// # HTTP Request
///
/// `DELETE /posts/{id}`
///
/// # Response
///
/// - `200 OK` - post deleted, empty `data` list
/// - `400 Bad Request` - `id` is not a UUID
/// - `404 Not Found` - no such post
pub async fn delete_handler<R>(
    State(state): State<AppState<R>>,
    PostId(id): PostId,
) -> RestResult<Envelope<Vec<PostPayload>>>
where
    R: PostRepository + 'static,
{
    debug!(%id, "Processing delete request");

    state.service().remove_post(id).await?;

    debug!(%id, "Post deleted");
    Ok(Envelope::success(Vec::new(), "Post removed"))
}
