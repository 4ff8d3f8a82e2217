//! Document store abstraction.
//!
//! [`DocumentStore`] is the seam between the repository and the network client
//! of the search backend. A store executes one [`StoreRequest`] per call and
//! hands back a [`StoreResponse`] whose body is read at most once. The body is
//! an owned handle: dropping the response releases the underlying connection
//! resource, whichever path the caller takes.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Operation, StorageError, StorageResult};
use crate::types::DocumentVersion;

/// A single request against the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// Fetch one document by id.
    Get {
        /// Target index.
        index: String,
        /// Document id.
        id: String,
    },
    /// Run a search with a raw JSON body.
    Search {
        /// Target index.
        index: String,
        /// Raw JSON query body.
        body: Bytes,
    },
    /// Index (insert or overwrite) a document under an explicit id.
    Index {
        /// Target index.
        index: String,
        /// Document id.
        id: String,
        /// Raw JSON document.
        body: Bytes,
    },
    /// Partially update a document.
    Update {
        /// Target index.
        index: String,
        /// Document id.
        id: String,
        /// Raw JSON update body (`{"doc": {...}}`).
        body: Bytes,
        /// Only apply the update if the document is still at this version.
        if_version: Option<DocumentVersion>,
    },
    /// Delete a document by id.
    Delete {
        /// Target index.
        index: String,
        /// Document id.
        id: String,
    },
}

impl StoreRequest {
    /// Returns the operation this request performs.
    pub fn operation(&self) -> Operation {
        match self {
            StoreRequest::Get { .. } => Operation::Get,
            StoreRequest::Search { .. } => Operation::Search,
            StoreRequest::Index { .. } => Operation::Index,
            StoreRequest::Update { .. } => Operation::Update,
            StoreRequest::Delete { .. } => Operation::Delete,
        }
    }

    /// Returns the index the request targets.
    pub fn index(&self) -> &str {
        match self {
            StoreRequest::Get { index, .. }
            | StoreRequest::Search { index, .. }
            | StoreRequest::Index { index, .. }
            | StoreRequest::Update { index, .. }
            | StoreRequest::Delete { index, .. } => index,
        }
    }

    /// Returns the document id, if the request addresses a single document.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            StoreRequest::Get { id, .. }
            | StoreRequest::Index { id, .. }
            | StoreRequest::Update { id, .. }
            | StoreRequest::Delete { id, .. } => Some(id),
            StoreRequest::Search { .. } => None,
        }
    }

    /// Returns `index/id` for document requests, `index` for searches.
    pub fn target(&self) -> String {
        match self.document_id() {
            Some(id) => format!("{}/{}", self.index(), id),
            None => self.index().to_string(),
        }
    }
}

/// The body of a store response.
///
/// Implementations own whatever resource backs the body (an HTTP response
/// stream for a real backend). The resource is released when the body is
/// dropped.
#[async_trait]
pub trait ResponseBody: Send {
    /// Reads the remaining body.
    async fn read_to_end(&mut self) -> StorageResult<Bytes>;
}

/// A fully buffered response body.
#[derive(Debug, Clone, Default)]
pub struct BufferedBody(Bytes);

impl BufferedBody {
    /// Creates a body from bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }
}

#[async_trait]
impl ResponseBody for BufferedBody {
    async fn read_to_end(&mut self) -> StorageResult<Bytes> {
        Ok(std::mem::take(&mut self.0))
    }
}

/// A response from the document store.
pub struct StoreResponse {
    status: u16,
    body: Box<dyn ResponseBody>,
}

impl fmt::Debug for StoreResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl StoreResponse {
    /// Creates a response from a status code and body.
    pub fn new(status: u16, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    /// Creates a response with a buffered body.
    pub fn buffered(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, BufferedBody::new(body))
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consumes the response and returns the body bytes.
    pub async fn bytes(mut self) -> StorageResult<Bytes> {
        self.body.read_to_end().await
    }

    /// Consumes the response and returns the body as text.
    ///
    /// Read failures and invalid UTF-8 yield whatever could be recovered; this
    /// is only used to build error messages.
    pub async fn text(self) -> String {
        match self.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    /// Consumes the response and parses the body as JSON.
    pub async fn json<T: DeserializeOwned>(self, operation: Operation) -> StorageResult<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::MalformedResponse {
            operation,
            message: e.to_string(),
        })
    }
}

/// A network client for the search backend.
///
/// Implementations must be safe to share across any number of concurrent
/// requests; the repository holds one instance behind an `Arc` for the life of
/// the process.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Returns a human-readable name for this store.
    fn backend_name(&self) -> &'static str;

    /// Executes one request.
    ///
    /// Transport failures are returned as errors. Any response the backend
    /// produces, including error statuses, is returned as `Ok`.
    async fn execute(&self, request: StoreRequest) -> StorageResult<StoreResponse>;

    /// Checks that the backend is reachable and healthy.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
