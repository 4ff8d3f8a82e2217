//! Post service: translation between HTTP types, posts and the repository.
//!
//! The service owns the few decisions that sit above storage:
//!
//! - the list query (`match_all`, bounded by a configured `size`)
//! - assigning id and creation time on create
//! - re-fetching before an update, so that updating an unknown id issues no
//!   write and reports [`RestError::RecordDoesNotExist`]
//! - optionally guarding the update with the version read by that re-fetch

use std::sync::Arc;

use chrono::Utc;
use esposts_persistence::core::PostRepository;
use esposts_persistence::error::StorageError;
use esposts_persistence::types::Post;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{RestError, RestResult};
use crate::types::{PostInput, PostPayload};

/// Tunables of the [`PostService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// `size` of the list query.
    pub max_results: usize,
    /// Whether updates are conditional on the version read before them.
    pub optimistic_updates: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            max_results: 10000,
            optimistic_updates: true,
        }
    }
}

impl From<&ServerConfig> for ServiceSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_results: config.max_results,
            optimistic_updates: config.optimistic_updates,
        }
    }
}

/// CRUD operations on posts, expressed in HTTP types.
pub struct PostService<R> {
    repository: Arc<R>,
    settings: ServiceSettings,
}

impl<R> Clone for PostService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: self.settings,
        }
    }
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service over a shared repository.
    pub fn new(repository: Arc<R>, settings: ServiceSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Returns the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the service settings.
    pub fn settings(&self) -> ServiceSettings {
        self.settings
    }

    /// Builds the search body used to list every post.
    pub fn list_query(&self) -> RestResult<Vec<u8>> {
        let query = json!({
            "query": { "match_all": {} },
            "size": self.settings.max_results,
        });
        serde_json::to_vec(&query).map_err(|e| RestError::InternalError {
            message: format!("failed to encode list query: {}", e),
        })
    }

    /// Lists posts in the order the store returns them.
    pub async fn find_posts(&self) -> RestResult<Vec<PostPayload>> {
        let query = self.list_query()?;
        let posts = self.repository.fetch_many(query).await?;
        Ok(posts.into_iter().map(PostPayload::from).collect())
    }

    /// Fetches one post.
    pub async fn find_post(&self, id: Uuid) -> RestResult<PostPayload> {
        let post = self.repository.fetch_by_id(id).await?;
        Ok(post.into())
    }

    /// Creates a post from caller input. A title is required.
    pub async fn add_post(&self, input: PostInput) -> RestResult<PostPayload> {
        let title = match input.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                return Err(RestError::BadRequest {
                    message: "title is required".to_string(),
                });
            }
        };

        let mut post = Post::new(title);
        input.apply_to(&mut post);
        post.title = post.title.trim().to_string();

        debug!(id = %post.id, "Creating post");
        self.repository
            .create(post.id, post.to_source_bytes()?)
            .await?;
        Ok(post.into())
    }

    /// Updates a post after re-fetching it.
    ///
    /// The merged record is written back in full. With optimistic updates
    /// enabled the write only applies if nobody wrote the post in between;
    /// otherwise the later write wins.
    pub async fn update_post(&self, id: Uuid, input: PostInput) -> RestResult<PostPayload> {
        let (mut post, version) = if self.settings.optimistic_updates {
            let (post, version) = self
                .repository
                .fetch_versioned(id)
                .await
                .map_err(|e| missing_record(id, e))?;
            (post, Some(version))
        } else {
            let post = self
                .repository
                .fetch_by_id(id)
                .await
                .map_err(|e| missing_record(id, e))?;
            (post, None)
        };

        post.touch(Utc::now());
        input.apply_to(&mut post);
        let body = post.to_source_bytes()?;

        let written = match version {
            Some(version) => self.repository.update_if_version(id, body, version).await,
            None => self.repository.update(id, body).await,
        };
        written.map_err(|e| {
            if matches!(e, StorageError::PreconditionFailed { .. }) {
                warn!(%id, "Post changed between read and update");
            }
            missing_record(id, e)
        })?;

        Ok(post.into())
    }

    /// Deletes a post.
    pub async fn remove_post(&self, id: Uuid) -> RestResult<()> {
        self.repository.remove(id).await?;
        Ok(())
    }
}

/// Reports a not-found during update as a missing record.
fn missing_record(id: Uuid, err: StorageError) -> RestError {
    if err.is_not_found() {
        RestError::RecordDoesNotExist { id }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use esposts_persistence::error::StorageResult;
    use esposts_persistence::types::DocumentVersion;

    struct EmptyRepository;

    #[async_trait]
    impl PostRepository for EmptyRepository {
        fn backend_name(&self) -> &'static str {
            "empty"
        }

        async fn fetch_by_id(&self, id: Uuid) -> StorageResult<Post> {
            Err(StorageError::NotFound {
                index: "posts".to_string(),
                id: id.to_string(),
            })
        }

        async fn fetch_versioned(&self, id: Uuid) -> StorageResult<(Post, DocumentVersion)> {
            self.fetch_by_id(id).await.map(|p| {
                (
                    p,
                    DocumentVersion {
                        seq_no: 0,
                        primary_term: 1,
                    },
                )
            })
        }

        async fn fetch_many(&self, _query: Vec<u8>) -> StorageResult<Vec<Post>> {
            Ok(Vec::new())
        }

        async fn create(&self, _id: Uuid, _body: Vec<u8>) -> StorageResult<()> {
            Ok(())
        }

        async fn update(&self, _id: Uuid, _body: Vec<u8>) -> StorageResult<()> {
            panic!("update must not be called")
        }

        async fn update_if_version(
            &self,
            _id: Uuid,
            _body: Vec<u8>,
            _version: DocumentVersion,
        ) -> StorageResult<()> {
            panic!("update must not be called")
        }

        async fn remove(&self, _id: Uuid) -> StorageResult<()> {
            Ok(())
        }

        async fn health_check(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    fn service(settings: ServiceSettings) -> PostService<EmptyRepository> {
        PostService::new(Arc::new(EmptyRepository), settings)
    }

    #[test]
    fn test_list_query_carries_size() {
        let service = service(ServiceSettings {
            max_results: 25,
            optimistic_updates: true,
        });
        let query: serde_json::Value =
            serde_json::from_slice(&service.list_query().unwrap()).unwrap();
        assert_eq!(query, json!({ "query": { "match_all": {} }, "size": 25 }));
    }

    #[tokio::test]
    async fn test_add_post_requires_title() {
        let service = service(ServiceSettings::default());
        let err = service
            .add_post(PostInput {
                title: Some("   ".to_string()),
                done: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_add_post_assigns_identity() {
        let service = service(ServiceSettings::default());
        let payload = service
            .add_post(PostInput {
                title: Some(" write docs ".to_string()),
                done: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(payload.title, "write docs");
        assert!(payload.done);
        assert!(payload.updated.is_none());
        assert_eq!(payload.id.get_version_num(), 4);
    }

    #[tokio::test]
    async fn test_update_unknown_post_issues_no_write() {
        for optimistic_updates in [true, false] {
            let service = service(ServiceSettings {
                max_results: 10,
                optimistic_updates,
            });
            let id = Uuid::new_v4();
            let err = service
                .update_post(id, PostInput::default())
                .await
                .unwrap_err();
            assert!(matches!(err, RestError::RecordDoesNotExist { id: e } if e == id));
        }
    }
}
