//! Wire types of the HTTP surface.
//!
//! [`PostInput`] is what callers send; [`PostPayload`] is what they get back.
//! Neither is the stored record: the service copies fields between them and
//! [`Post`].

use chrono::{DateTime, Utc};
use esposts_persistence::types::Post;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied fields for create and update.
///
/// Both fields are optional on the wire. Create requires a title; update
/// merges whichever fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostInput {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New completion flag.
    #[serde(default)]
    pub done: Option<bool>,
}

impl PostInput {
    /// Copies the present fields onto a post.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(done) = self.done {
            post.done = done;
        }
    }
}

/// A post as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    /// Post id.
    pub id: Uuid,
    /// Post title.
    pub title: String,
    /// Completion flag.
    pub done: bool,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Time of the last update, `null` if never updated.
    pub updated: Option<DateTime<Utc>>,
}

impl From<Post> for PostPayload {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            done: post.done,
            created: post.created,
            updated: post.updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_present_fields_only() {
        let mut post = Post::new("original");
        PostInput {
            title: None,
            done: Some(true),
        }
        .apply_to(&mut post);
        assert_eq!(post.title, "original");
        assert!(post.done);

        PostInput {
            title: Some("renamed".to_string()),
            done: None,
        }
        .apply_to(&mut post);
        assert_eq!(post.title, "renamed");
        assert!(post.done);
    }

    #[test]
    fn test_input_rejects_unknown_fields() {
        let result = serde_json::from_str::<PostInput>(r#"{"title":"a","id":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_from_post() {
        let post = Post::new("p");
        let payload = PostPayload::from(post.clone());
        assert_eq!(payload.id, post.id);
        assert_eq!(payload.created, post.created);
        assert!(payload.updated.is_none());
    }
}
