//! List handler: `GET /posts`

use axum::extract::State;
use esposts_persistence::core::PostRepository;
use tracing::debug;

use crate::error::RestResult;
use crate::responses::Envelope;
use crate::state::AppState;
use crate::types::PostPayload;

/// Handler for listing posts.
///
/// # HTTP Request
///
/// `GET /posts`
///
/// # Response
///
/// - `200 OK` - every post, in store order (empty list when there are none)
/// - `502`/`503`/`504` - the store failed
pub async fn list_handler<R>(
    State(state): State<AppState<R>>,
) -> RestResult<Envelope<Vec<PostPayload>>>
where
    R: PostRepository + 'static,
{
    debug!("Processing list request");

    let posts = state.service().find_posts().await?;

    debug!(count = posts.len(), "Returning posts");
    Ok(Envelope::success(posts, "Posts fetched"))
}
