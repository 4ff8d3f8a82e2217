//! Core types for the persistence layer.
//!
//! - [`Post`] - the document record held by the store
//! - [`DocumentVersion`] - optimistic-concurrency token of a stored document

mod post;

pub use post::{DocumentVersion, Post};
