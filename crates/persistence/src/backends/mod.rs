//! Search backend implementations.
//!
//! Each backend implements [`DocumentStore`](crate::core::DocumentStore) and is
//! gated behind a feature flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Elasticsearch | `elasticsearch` | Elasticsearch 7.x/8.x document APIs |

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
