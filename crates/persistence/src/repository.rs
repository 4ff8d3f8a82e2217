//! Post repository over a [`DocumentStore`].
//!
//! [`DocumentRepository`] turns typed post operations into store requests,
//! classifies failed responses and decodes `_source` objects back into posts.
//!
//! Each operation runs its round trip (send, status check, body read, decode)
//! on a dedicated task and waits for that task's single result. The wait is
//! bounded by [`RepositoryConfig::operation_timeout`]; on expiry, or when the
//! caller stops waiting, the task is aborted and whatever response it held is
//! dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{DocumentStore, PostRepository, StoreRequest, StoreResponse};
use crate::decode::decode_post;
use crate::error::{Operation, StorageError, StorageResult};
use crate::types::{DocumentVersion, Post};

/// Default index holding posts.
pub const DEFAULT_INDEX: &str = "posts";

/// Default bound on a single round trip.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`DocumentRepository`].
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Index holding posts.
    pub index: String,
    /// Upper bound on each round trip.
    pub operation_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX.to_string(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Post repository backed by a document store.
pub struct DocumentRepository<S> {
    store: Arc<S>,
    config: RepositoryConfig,
}

impl<S> Clone for DocumentRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: DocumentStore> DocumentRepository<S> {
    /// Creates a repository over a shared store handle.
    pub fn new(store: Arc<S>, config: RepositoryConfig) -> Self {
        Self { store, config }
    }

    /// Returns the index holding posts.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    /// Returns the shared store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Runs one round trip on a dedicated task and waits for its result.
    async fn run<T, F, Fut>(&self, operation: Operation, round_trip: F) -> StorageResult<T>
    where
        F: FnOnce(Arc<S>, String) -> Fut,
        Fut: Future<Output = StorageResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = AbortOnDrop(tokio::spawn(round_trip(
            Arc::clone(&self.store),
            self.config.index.clone(),
        )));

        match tokio::time::timeout(self.config.operation_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(self.task_failed(operation, join_error)),
            Err(_) => {
                let timeout_ms = self.config.operation_timeout.as_millis() as u64;
                warn!(%operation, timeout_ms, "Store round trip timed out");
                Err(StorageError::Timeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }

    fn task_failed(&self, operation: Operation, error: JoinError) -> StorageError {
        StorageError::BackendUnavailable {
            backend_name: self.store.backend_name().to_string(),
            operation,
            message: format!("round trip task failed: {}", error),
        }
    }
}

#[async_trait]
impl<S: DocumentStore> PostRepository for DocumentRepository<S> {
    fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn fetch_by_id(&self, id: Uuid) -> StorageResult<Post> {
        debug!(index = %self.index(), %id, "Fetching post");
        let (post, _) = self
            .run(Operation::Get, move |store, index| async move {
                get_document(store.as_ref(), index, id).await
            })
            .await?;
        Ok(post)
    }

    async fn fetch_versioned(&self, id: Uuid) -> StorageResult<(Post, DocumentVersion)> {
        debug!(index = %self.index(), %id, "Fetching post with version");
        let (post, version) = self
            .run(Operation::Get, move |store, index| async move {
                get_document(store.as_ref(), index, id).await
            })
            .await?;
        let version = version.ok_or_else(|| StorageError::MalformedResponse {
            operation: Operation::Get,
            message: "response carries no _seq_no/_primary_term".to_string(),
        })?;
        Ok((post, version))
    }

    async fn fetch_many(&self, query: Vec<u8>) -> StorageResult<Vec<Post>> {
        debug!(index = %self.index(), "Searching posts");
        let query = Bytes::from(query);
        let posts = self
            .run(Operation::Search, move |store, index| async move {
                search_documents(store.as_ref(), index, query).await
            })
            .await?;
        debug!(count = posts.len(), "Search returned posts");
        Ok(posts)
    }

    async fn create(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()> {
        debug!(index = %self.index(), %id, "Indexing post");
        let body = Bytes::from(body);
        self.run(Operation::Index, move |store, index| async move {
            let request = StoreRequest::Index {
                index,
                id: id.to_string(),
                body,
            };
            send(store.as_ref(), request).await.map(drop)
        })
        .await
    }

    async fn update(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()> {
        debug!(index = %self.index(), %id, "Updating post");
        let body = build_update_body(&body)?;
        self.run(Operation::Update, move |store, index| async move {
            update_document(store.as_ref(), index, id, body, None).await
        })
        .await
    }

    async fn update_if_version(
        &self,
        id: Uuid,
        body: Vec<u8>,
        version: DocumentVersion,
    ) -> StorageResult<()> {
        debug!(
            index = %self.index(),
            %id,
            seq_no = version.seq_no,
            primary_term = version.primary_term,
            "Conditionally updating post"
        );
        let body = build_update_body(&body)?;
        self.run(Operation::Update, move |store, index| async move {
            update_document(store.as_ref(), index, id, body, Some(version)).await
        })
        .await
    }

    async fn remove(&self, id: Uuid) -> StorageResult<()> {
        debug!(index = %self.index(), %id, "Deleting post");
        self.run(Operation::Delete, move |store, index| async move {
            let request = StoreRequest::Delete {
                index,
                id: id.to_string(),
            };
            send(store.as_ref(), request).await.map(drop)
        })
        .await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.run(Operation::Health, |store, _| async move {
            store.health_check().await
        })
        .await
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

#[derive(Deserialize)]
struct GetEnvelope {
    #[serde(rename = "_source")]
    source: Option<Map<String, Value>>,
    #[serde(rename = "_seq_no")]
    seq_no: Option<i64>,
    #[serde(rename = "_primary_term")]
    primary_term: Option<i64>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Map<String, Value>,
}

#[derive(Serialize)]
struct PartialUpdate<'a> {
    doc: &'a RawValue,
}

/// Wraps a document body as a partial update: `{"doc": <body>}`.
fn build_update_body(body: &[u8]) -> StorageResult<Bytes> {
    let doc: &RawValue = serde_json::from_slice(body).map_err(|e| StorageError::Serialization {
        message: format!("update body is not valid JSON: {}", e),
    })?;
    serde_json::to_vec(&PartialUpdate { doc })
        .map(Bytes::from)
        .map_err(|e| StorageError::Serialization {
            message: format!("failed to wrap update body: {}", e),
        })
}

/// Executes a request and turns non-2xx responses into errors.
///
/// 404 on a document request is `NotFound`; 409 on a conditional update is
/// `PreconditionFailed`; anything else is a `Backend` error carrying the
/// status and the response text.
async fn send<S: DocumentStore + ?Sized>(
    store: &S,
    request: StoreRequest,
) -> StorageResult<StoreResponse> {
    let operation = request.operation();
    let target = request.target();
    let index = request.index().to_string();
    let id = request.document_id().map(str::to_string);
    let conditional = matches!(
        request,
        StoreRequest::Update {
            if_version: Some(_),
            ..
        }
    );

    let response = store.execute(request).await?;
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = response.text().await;
    debug!(%operation, %target, status, "Store rejected request");

    Err(match (status, id) {
        (404, Some(id)) => StorageError::NotFound { index, id },
        (409, Some(id)) if conditional => StorageError::PreconditionFailed { index, id, message },
        _ => StorageError::Backend {
            operation,
            target,
            status,
            message,
        },
    })
}

async fn get_document<S: DocumentStore + ?Sized>(
    store: &S,
    index: String,
    id: Uuid,
) -> StorageResult<(Post, Option<DocumentVersion>)> {
    let request = StoreRequest::Get {
        index,
        id: id.to_string(),
    };
    let envelope: GetEnvelope = send(store, request).await?.json(Operation::Get).await?;

    let source = envelope
        .source
        .ok_or_else(|| StorageError::MalformedResponse {
            operation: Operation::Get,
            message: "response carries no _source".to_string(),
        })?;
    let post = decode_post(&source)?;

    let version = match (envelope.seq_no, envelope.primary_term) {
        (Some(seq_no), Some(primary_term)) => Some(DocumentVersion {
            seq_no,
            primary_term,
        }),
        _ => None,
    };
    Ok((post, version))
}

async fn search_documents<S: DocumentStore + ?Sized>(
    store: &S,
    index: String,
    query: Bytes,
) -> StorageResult<Vec<Post>> {
    let request = StoreRequest::Search { index, body: query };
    let response = match send(store, request).await {
        Ok(response) => response,
        // A missing index has no posts in it
        Err(StorageError::Backend {
            status: 404,
            message,
            ..
        }) if message.contains("index_not_found_exception") => {
            debug!("Search index does not exist yet, returning no posts");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let envelope: SearchEnvelope = response.json(Operation::Search).await?;
    let posts = envelope
        .hits
        .hits
        .iter()
        .map(|hit| decode_post(&hit.source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

async fn update_document<S: DocumentStore + ?Sized>(
    store: &S,
    index: String,
    id: Uuid,
    body: Bytes,
    if_version: Option<DocumentVersion>,
) -> StorageResult<()> {
    let request = StoreRequest::Update {
        index,
        id: id.to_string(),
        body,
        if_version,
    };
    send(store, request).await.map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_update_body_wraps_doc() {
        let body = build_update_body(br#"{"title":"t","done":true}"#).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["doc"]["title"], "t");
        assert_eq!(value["doc"]["done"], true);
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_build_update_body_rejects_invalid_json() {
        let err = build_update_body(b"{not json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[test]
    fn test_default_config() {
        let config = RepositoryConfig::default();
        assert_eq!(config.index, "posts");
        assert_eq!(config.operation_timeout, Duration::from_secs(10));
    }
}
