//! Elasticsearch backend implementation.
//!
//! [`ElasticsearchBackend`] is the [`DocumentStore`](crate::core::DocumentStore)
//! used in production. It wraps a single `elasticsearch` client built at
//! startup and translates each store request into the matching document API
//! call (`_doc`, `_search`, `_update`).
//!
//! # Index Structure
//!
//! All posts live in one index (default `posts`). The document id is the post
//! UUID. Timestamps are mapped as `date` fields accepting both ISO 8601 strings
//! and epoch milliseconds.
//!
//! # Example
//!
//! ```ignore
//! use esposts_persistence::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let backend = ElasticsearchBackend::connect(config).await?;
//! backend.initialize().await?;
//! ```

mod backend;
mod schema;
mod storage;

pub use backend::{ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig};
pub use schema::create_index_mapping;
