//! Posts persistence layer over Elasticsearch.
//!
//! This crate stores and retrieves posts (small todo-like records) in a single
//! Elasticsearch index, in two layers:
//!
//! - [`core::DocumentStore`] sends one raw request to the search backend and
//!   returns the raw response.
//! - [`core::PostRepository`] is the typed CRUD surface. Its implementation,
//!   [`DocumentRepository`], turns failed responses into [`StorageError`]s and
//!   decodes `_source` objects into [`Post`]s.
//!
//! # Features
//!
//! - `elasticsearch` (default) - the [`backends::elasticsearch`] store
//!
//! # Architecture
//!
//! - [`types`] - posts and document versions
//! - [`decode`] - `_source` decoding, including mixed timestamp encodings
//! - [`error`] - error types for all operations
//! - [`core`] - store and repository traits
//! - [`repository`] - the repository implementation
//! - [`backends`] - store implementations
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "elasticsearch")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use esposts_persistence::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//! use esposts_persistence::{DocumentRepository, PostRepository, RepositoryConfig};
//!
//! let backend = ElasticsearchBackend::connect(ElasticsearchConfig::default()).await?;
//! let repository = DocumentRepository::new(Arc::new(backend), RepositoryConfig::default());
//!
//! let posts = repository
//!     .fetch_many(br#"{"query":{"match_all":{}}}"#.to_vec())
//!     .await?;
//! println!("{} posts", posts.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod decode;
pub mod error;
pub mod repository;
pub mod types;

// Re-export commonly used types at crate root
pub use core::{DocumentStore, PostRepository, StoreRequest, StoreResponse};
pub use error::{DecodeError, ErrorKind, Operation, StorageError, StorageResult};
pub use repository::{DocumentRepository, RepositoryConfig};
pub use types::{DocumentVersion, Post};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
