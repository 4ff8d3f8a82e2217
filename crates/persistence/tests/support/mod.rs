//! Test infrastructure for the persistence layer.
//!
//! [`MockStore`] is a scripted [`DocumentStore`]: each call to `execute`
//! records the request and replays the next scripted reply. Every response
//! body it hands out is tracked, so tests can assert that all of them were
//! released no matter which path the repository took.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{Value, json};

use esposts_persistence::core::{DocumentStore, ResponseBody, StoreRequest, StoreResponse};
use esposts_persistence::error::{Operation, StorageError, StorageResult};
use esposts_persistence::{DocumentRepository, RepositoryConfig};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and body.
    Respond { status: u16, body: Bytes },
    /// Respond with a status, then fail while reading the body.
    BrokenBody { status: u16 },
    /// Respond with a status, then never finish reading the body.
    StalledBody { status: u16 },
    /// Fail before any response exists.
    TransportError(String),
    /// Never answer.
    Hang,
}

impl Reply {
    /// A response with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Respond {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    /// A response with a raw text body.
    pub fn text(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            body: Bytes::from(body.to_string()),
        }
    }
}

/// Counters shared between the store and the bodies it hands out.
#[derive(Debug, Default)]
pub struct BodyCounters {
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl BodyCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

enum BodyMode {
    Ready(Bytes),
    Broken,
    Stalled,
}

struct TrackedBody {
    mode: BodyMode,
    counters: Arc<BodyCounters>,
}

impl TrackedBody {
    fn open(mode: BodyMode, counters: &Arc<BodyCounters>) -> Self {
        counters.opened.fetch_add(1, Ordering::SeqCst);
        Self {
            mode,
            counters: Arc::clone(counters),
        }
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResponseBody for TrackedBody {
    async fn read_to_end(&mut self) -> StorageResult<Bytes> {
        match &mut self.mode {
            BodyMode::Ready(bytes) => Ok(std::mem::take(bytes)),
            BodyMode::Broken => Err(StorageError::BackendUnavailable {
                backend_name: "mock".to_string(),
                operation: Operation::Get,
                message: "connection reset while reading body".to_string(),
            }),
            BodyMode::Stalled => std::future::pending().await,
        }
    }
}

/// A scripted document store.
#[derive(Default)]
pub struct MockStore {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<StoreRequest>>,
    counters: Arc<BodyCounters>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that replays `replies` in order.
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let store = Self::new();
        store.replies.lock().extend(replies);
        store
    }

    /// Queues another reply.
    pub fn push(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Returns every request executed so far.
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.requests.lock().clone()
    }

    /// Returns the only request executed so far.
    pub fn single_request(&self) -> StoreRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }

    pub fn counters(&self) -> &Arc<BodyCounters> {
        &self.counters
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn execute(&self, request: StoreRequest) -> StorageResult<StoreResponse> {
        let operation = request.operation();
        self.requests.lock().push(request);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .expect("no scripted reply left");

        let (status, mode) = match reply {
            Reply::Respond { status, body } => (status, BodyMode::Ready(body)),
            Reply::BrokenBody { status } => (status, BodyMode::Broken),
            Reply::StalledBody { status } => (status, BodyMode::Stalled),
            Reply::TransportError(message) => {
                return Err(StorageError::BackendUnavailable {
                    backend_name: "mock".to_string(),
                    operation,
                    message,
                });
            }
            Reply::Hang => std::future::pending().await,
        };

        Ok(StoreResponse::new(
            status,
            TrackedBody::open(mode, &self.counters),
        ))
    }
}

/// Builds a repository over a mock store with the given round-trip bound.
pub fn repository(
    store: MockStore,
    timeout: Duration,
) -> (DocumentRepository<MockStore>, Arc<MockStore>) {
    let store = Arc::new(store);
    let config = RepositoryConfig {
        index: "posts".to_string(),
        operation_timeout: timeout,
    };
    (DocumentRepository::new(Arc::clone(&store), config), store)
}

/// Waits until every body the store handed out has been dropped.
///
/// Aborted tasks are torn down by the runtime asynchronously, so the last
/// drop can lag the caller by a few scheduler turns.
pub async fn assert_all_released(counters: &BodyCounters) {
    for _ in 0..100 {
        if counters.released() == counters.opened() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "{} response bodies opened but only {} released",
        counters.opened(),
        counters.released()
    );
}

/// A `_source` object with ISO 8601 timestamps.
pub fn source(id: &str, title: &str, done: bool, created: Value) -> Value {
    json!({
        "id": id,
        "title": title,
        "done": done,
        "created": created,
    })
}

/// A successful get-by-id body.
pub fn found(source: Value) -> Value {
    json!({
        "_index": "posts",
        "_id": source["id"].clone(),
        "_version": 3,
        "_seq_no": 7,
        "_primary_term": 2,
        "found": true,
        "_source": source,
    })
}

/// A get-by-id body for a missing document.
pub fn not_found(id: &str) -> Value {
    json!({
        "_index": "posts",
        "_id": id,
        "found": false,
    })
}

/// A search body with the given `_source` objects as hits.
pub fn hits(sources: Vec<Value>) -> Value {
    let hits: Vec<Value> = sources
        .into_iter()
        .map(|source| {
            json!({
                "_index": "posts",
                "_id": source["id"].clone(),
                "_score": 1.0,
                "_source": source,
            })
        })
        .collect();
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": { "value": hits.len(), "relation": "eq" },
            "max_score": 1.0,
            "hits": hits,
        }
    })
}

/// A write acknowledgement body.
pub fn acknowledged(id: &str, result: &str) -> Value {
    json!({
        "_index": "posts",
        "_id": id,
        "_version": 1,
        "result": result,
        "_seq_no": 0,
        "_primary_term": 1,
    })
}
