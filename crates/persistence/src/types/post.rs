//! The post document record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// A post as stored in the document store.
///
/// The `id` doubles as the store's document id. `created` is set once when
/// the post is first built; `updated` stays `None` until the first update and
/// is restamped on every update after that.
///
/// Serialises to the `_source` shape the store holds:
///
/// ```
/// use esposts_persistence::types::Post;
///
/// let post = Post::new("hello");
/// let source = serde_json::to_value(&post).unwrap();
/// assert_eq!(source["title"], "hello");
/// assert_eq!(source["done"], false);
/// assert!(source["updated"].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Unique identifier, assigned by the creator.
    pub id: Uuid,
    /// Post title.
    pub title: String,
    /// Completion flag.
    pub done: bool,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Time of the most recent update, if any.
    pub updated: Option<DateTime<Utc>>,
}

impl Post {
    /// Creates a new post with a fresh v4 id, stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, Utc::now())
    }

    /// Creates a post with an explicit id and creation time.
    pub fn with_id(id: Uuid, title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            created,
            updated: None,
        }
    }

    /// Stamps the update time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated = Some(at);
    }

    /// Serialises the post into a `_source` request body.
    pub fn to_source_bytes(&self) -> StorageResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StorageError::Serialization {
            message: format!("failed to serialise post {}: {}", self.id, e),
        })
    }
}

/// Optimistic-concurrency token of a stored document.
///
/// Taken from the `_seq_no` and `_primary_term` of a get response and handed
/// back on a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// Sequence number of the last write.
    pub seq_no: i64,
    /// Primary term of the last write.
    pub primary_term: i64,
}
