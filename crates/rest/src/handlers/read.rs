//! Read handler: `GET /posts/{id}`

use axum::extract::State;
use esposts_persistence::core::PostRepository;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::PostId;
use crate::responses::Envelope;
use crate::state::AppState;
use crate::types::PostPayload;

/// Handler for reading one post.
///
/// The post is returned as a one-element `data` list.
///
/// # HTTP Request
///
/// `GET /posts/{id}`
///
/// # Response
///
/// - `200 OK` - post found
/// - `400 Bad Request` - `id` is not a UUID
/// - `404 Not Found` - no such post
pub async fn read_handler<R>(
    State(state): State<AppState<R>>,
    PostId(id): PostId,
) -> RestResult<Envelope<Vec<PostPayload>>>
where
    R: PostRepository + 'static,
{
    debug!(%id, "Processing read request");

    let post = state.service().find_post(id).await?;

    Ok(Envelope::success(vec![post], "Post fetched"))
}
