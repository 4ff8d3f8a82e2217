//! Post id path extractor.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::RestError;

/// Axum extractor for the `{id}` path parameter.
///
/// # Example
///
/// ```rust,ignore
/// use esposts_rest::extractors::PostId;
///
/// async fn handler(PostId(id): PostId) {
///     println!("Post: {}", id);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub Uuid);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: e.body_text(),
            })?;

        parse_post_id(&raw).map(PostId)
    }
}

/// Parses a post id, rejecting anything that is not a UUID.
pub(crate) fn parse_post_id(raw: &str) -> Result<Uuid, RestError> {
    Uuid::parse_str(raw).map_err(|e| RestError::BadRequest {
        message: format!("invalid post id '{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_post_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_invalid_id() {
        let err = parse_post_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, RestError::BadRequest { .. }));
        assert!(err.to_string().contains("not-a-uuid"));
    }
}
