//! Shared test infrastructure for the REST API tests.
//!
//! [`InMemoryRepository`] stands in for Elasticsearch: it keeps `_source`
//! documents with a version each, merges updates like a partial-document
//! update, and can be told to fail the next call.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use esposts_persistence::core::PostRepository;
use esposts_persistence::decode::decode_post;
use esposts_persistence::error::{StorageError, StorageResult};
use esposts_persistence::types::{DocumentVersion, Post};
use esposts_rest::{ServerConfig, create_app_with_config};

struct StoredDocument {
    id: Uuid,
    source: Map<String, Value>,
    version: DocumentVersion,
}

#[derive(Default)]
struct Inner {
    documents: Vec<StoredDocument>,
    failures: VecDeque<StorageError>,
    next_seq_no: i64,
    interleave_write: bool,
}

/// A [`PostRepository`] over a vector of documents, in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<Inner>>,
    writes: Arc<AtomicUsize>,
    searches: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a post directly, bypassing the HTTP surface.
    pub fn seed(&self, post: &Post) {
        let source = match serde_json::to_value(post) {
            Ok(Value::Object(map)) => map,
            other => panic!("post did not serialise to an object: {:?}", other),
        };
        self.seed_source(post.id, source);
    }

    /// Stores a raw `_source` document.
    pub fn seed_source(&self, id: Uuid, source: Map<String, Value>) {
        let mut inner = self.inner.lock();
        let version = next_version(&mut inner);
        inner.documents.push(StoredDocument {
            id,
            source,
            version,
        });
    }

    /// Makes the next repository call return `err`.
    pub fn fail_next(&self, err: StorageError) {
        self.inner.lock().failures.push_back(err);
    }

    /// Makes another writer land right after the next versioned fetch.
    pub fn interleave_next_write(&self) {
        self.inner.lock().interleave_write = true;
    }

    /// Bumps the version of a stored post, as a concurrent writer would.
    pub fn touch_version(&self, id: Uuid) {
        let mut inner = self.inner.lock();
        let version = next_version(&mut inner);
        if let Some(doc) = inner.documents.iter_mut().find(|d| d.id == id) {
            doc.version = version;
        }
    }

    /// Returns the decoded post stored under `id`, if any.
    pub fn stored(&self, id: Uuid) -> Option<Post> {
        let inner = self.inner.lock();
        inner
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(|d| decode_post(&d.source).expect("stored document must decode"))
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.inner.lock().documents.len()
    }

    /// Number of create, update and delete calls that reached the repository.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Search bodies received so far.
    pub fn searches(&self) -> Vec<Value> {
        self.searches.lock().clone()
    }

    fn injected_failure(&self) -> StorageResult<()> {
        match self.inner.lock().failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn next_version(inner: &mut Inner) -> DocumentVersion {
    inner.next_seq_no += 1;
    DocumentVersion {
        seq_no: inner.next_seq_no,
        primary_term: 1,
    }
}

fn not_found(id: Uuid) -> StorageError {
    StorageError::NotFound {
        index: "posts".to_string(),
        id: id.to_string(),
    }
}

fn parse_source(body: &[u8]) -> StorageResult<Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StorageError::Serialization {
            message: "body is not a JSON object".to_string(),
        }),
        Err(e) => Err(StorageError::Serialization {
            message: e.to_string(),
        }),
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_by_id(&self, id: Uuid) -> StorageResult<Post> {
        self.fetch_versioned(id).await.map(|(post, _)| post)
    }

    async fn fetch_versioned(&self, id: Uuid) -> StorageResult<(Post, DocumentVersion)> {
        self.injected_failure()?;
        let mut inner = self.inner.lock();
        let interleave = std::mem::take(&mut inner.interleave_write);
        let bumped = next_version(&mut inner);
        let doc = inner
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;
        let read = (decode_post(&doc.source)?, doc.version);
        if interleave {
            doc.version = bumped;
        }
        Ok(read)
    }

    async fn fetch_many(&self, query: Vec<u8>) -> StorageResult<Vec<Post>> {
        self.injected_failure()?;
        let query: Value = serde_json::from_slice(&query).map_err(|e| {
            StorageError::Serialization {
                message: e.to_string(),
            }
        })?;
        let size = query["size"].as_u64().unwrap_or(10) as usize;
        self.searches.lock().push(query);

        let inner = self.inner.lock();
        inner
            .documents
            .iter()
            .take(size)
            .map(|d| decode_post(&d.source).map_err(StorageError::from))
            .collect()
    }

    async fn create(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()> {
        self.injected_failure()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let source = parse_source(&body)?;

        let mut inner = self.inner.lock();
        let version = next_version(&mut inner);
        match inner.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.source = source;
                doc.version = version;
            }
            None => inner.documents.push(StoredDocument {
                id,
                source,
                version,
            }),
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()> {
        self.injected_failure()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let patch = parse_source(&body)?;

        let mut inner = self.inner.lock();
        let version = next_version(&mut inner);
        let doc = inner
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;
        doc.source.extend(patch);
        doc.version = version;
        Ok(())
    }

    async fn update_if_version(
        &self,
        id: Uuid,
        body: Vec<u8>,
        expected: DocumentVersion,
    ) -> StorageResult<()> {
        self.injected_failure()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let patch = parse_source(&body)?;

        let mut inner = self.inner.lock();
        let version = next_version(&mut inner);
        let doc = inner
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;
        if doc.version != expected {
            return Err(StorageError::PreconditionFailed {
                index: "posts".to_string(),
                id: id.to_string(),
                message: "version_conflict_engine_exception".to_string(),
            });
        }
        doc.source.extend(patch);
        doc.version = version;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> StorageResult<()> {
        self.injected_failure()?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock();
        let before = inner.documents.len();
        inner.documents.retain(|d| d.id != id);
        if inner.documents.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.injected_failure()
    }
}

/// Creates a test server over a fresh in-memory repository.
pub fn create_test_server() -> (TestServer, InMemoryRepository) {
    create_test_server_with_config(ServerConfig::for_testing())
}

/// Creates a test server with a custom configuration.
pub fn create_test_server_with_config(config: ServerConfig) -> (TestServer, InMemoryRepository) {
    let repository = InMemoryRepository::new();
    let app = create_app_with_config(repository.clone(), config);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, repository)
}
