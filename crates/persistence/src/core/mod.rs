//! Core storage traits and abstractions.
//!
//! - [`DocumentStore`] - network client of the search backend, one request per call
//! - [`PostRepository`] - typed CRUD over posts
//!
//! ```text
//! PostRepository            (typed posts, error classification)
//!     └── DocumentRepository<S>
//!             └── S: DocumentStore   (raw requests and responses)
//! ```

mod repository;
mod store;

pub use repository::PostRepository;
pub use store::{BufferedBody, DocumentStore, ResponseBody, StoreRequest, StoreResponse};
