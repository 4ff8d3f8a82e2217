//! Error types for the persistence layer.
//!
//! Every repository operation fails with a [`StorageError`]. The variants form a
//! small closed set so callers (the REST layer in particular) can branch on the
//! kind of failure instead of parsing messages:
//!
//! | Variant | Kind | Typical cause |
//! |---------|------|---------------|
//! | `NotFound` | [`ErrorKind::NotFound`] | store answered 404 for the id |
//! | `BackendUnavailable` | [`ErrorKind::BackendUnavailable`] | transport/connectivity failure |
//! | `Timeout` | [`ErrorKind::BackendUnavailable`] | round trip exceeded the operation timeout |
//! | `Backend` | [`ErrorKind::Backend`] | store answered with a non-2xx status |
//! | `MalformedResponse` | [`ErrorKind::DecodeFailure`] | response body is not the expected envelope |
//! | `Decode` | [`ErrorKind::DecodeFailure`] | a `_source` object failed to decode |
//! | `PreconditionFailed` | [`ErrorKind::PreconditionFailed`] | conditional update lost a race |
//! | `Serialization` | [`ErrorKind::Internal`] | outgoing body could not be encoded |
//! | `InvalidConfiguration` | [`ErrorKind::Internal`] | store client could not be built |

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store has no document with the given id.
    #[error("document not found: {index}/{id}")]
    NotFound { index: String, id: String },

    /// The store could not be reached.
    #[error("backend {backend_name} unavailable during {operation}: {message}")]
    BackendUnavailable {
        backend_name: String,
        operation: Operation,
        message: String,
    },

    /// The round trip did not complete within the operation timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: Operation, timeout_ms: u64 },

    /// The store reported the request as failed.
    #[error("{operation} failed for {target} (status {status}): {message}")]
    Backend {
        operation: Operation,
        target: String,
        status: u16,
        message: String,
    },

    /// The response body could not be parsed as a store envelope.
    #[error("failed to parse {operation} response: {message}")]
    MalformedResponse { operation: Operation, message: String },

    /// A `_source` object could not be decoded into a post.
    #[error("failed to decode _source into post: {0}")]
    Decode(#[from] DecodeError),

    /// A conditional write was rejected because the document changed.
    #[error("precondition failed for {index}/{id}: {message}")]
    PreconditionFailed {
        index: String,
        id: String,
        message: String,
    },

    /// An outgoing request body could not be encoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The store client could not be built from its configuration.
    #[error("invalid {backend_name} configuration: {message}")]
    InvalidConfiguration {
        backend_name: String,
        message: String,
    },
}

impl StorageError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::BackendUnavailable { .. } | StorageError::Timeout { .. } => {
                ErrorKind::BackendUnavailable
            }
            StorageError::Backend { .. } => ErrorKind::Backend,
            StorageError::MalformedResponse { .. } | StorageError::Decode(_) => {
                ErrorKind::DecodeFailure
            }
            StorageError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            StorageError::Serialization { .. } | StorageError::InvalidConfiguration { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns true if the error means the document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Coarse classification of a [`StorageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    BackendUnavailable,
    Backend,
    DecodeFailure,
    PreconditionFailed,
    Internal,
}

/// The repository operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Search,
    Index,
    Update,
    Delete,
    Info,
    Health,
    CreateIndex,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Get => "get",
            Operation::Search => "search",
            Operation::Index => "index",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Info => "info",
            Operation::Health => "health",
            Operation::CreateIndex => "create-index",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised while decoding a `_source` object into a post.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field is absent.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A field is present but has the wrong JSON type.
    #[error("field '{field}' has invalid type: expected {expected}, found {found}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A field has the right JSON type but its value cannot be parsed.
    #[error("field '{field}' has invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl DecodeError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::MissingField { field }
            | DecodeError::InvalidType { field, .. }
            | DecodeError::InvalidValue { field, .. } => field,
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
