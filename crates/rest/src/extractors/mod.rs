//! Axum extractors for the posts API.
//!
//! Both extractors reject with a [`RestError`](crate::error::RestError), so a
//! bad path or body still gets the standard envelope:
//!
//! - [`PostId`] - the `{id}` path segment parsed as a UUID
//! - [`PostBody`] - the request body parsed as a [`PostInput`](crate::types::PostInput)

mod post_body;
mod post_id;

pub use post_body::PostBody;
pub use post_id::PostId;
