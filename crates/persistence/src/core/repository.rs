//! Post repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::types::{DocumentVersion, Post};

/// CRUD access to posts.
///
/// Each operation performs exactly one round trip to the backing store.
/// Bodies are raw JSON: the caller serialises the post (see
/// [`Post::to_source_bytes`]) and the repository forwards the bytes.
///
/// # Example
///
/// ```ignore
/// use esposts_persistence::core::PostRepository;
/// use esposts_persistence::types::Post;
///
/// async fn example<R: PostRepository>(repo: &R) -> StorageResult<()> {
///     let post = Post::new("hello");
///     repo.create(post.id, post.to_source_bytes()?).await?;
///
///     let read = repo.fetch_by_id(post.id).await?;
///     assert_eq!(read.title, "hello");
///
///     repo.remove(post.id).await
/// }
/// ```
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Returns a human-readable name for the backing store.
    fn backend_name(&self) -> &'static str;

    /// Fetches a post by id.
    ///
    /// # Errors
    ///
    /// * `StorageError::NotFound` - the store has no such document
    /// * `StorageError::BackendUnavailable` / `Timeout` - the store could not be reached
    /// * `StorageError::Backend` - the store rejected the request
    /// * `StorageError::MalformedResponse` / `Decode` - the response could not be turned into a post
    async fn fetch_by_id(&self, id: Uuid) -> StorageResult<Post>;

    /// Fetches a post together with its concurrency token.
    async fn fetch_versioned(&self, id: Uuid) -> StorageResult<(Post, DocumentVersion)>;

    /// Runs a search with a raw JSON query body.
    ///
    /// Posts are returned in the order the store returned the hits. No hits is
    /// an empty list, not an error. If any hit fails to decode the whole call
    /// fails.
    async fn fetch_many(&self, query: Vec<u8>) -> StorageResult<Vec<Post>>;

    /// Indexes a post under an explicit id. The store decides whether this is
    /// an insert or an overwrite.
    async fn create(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()>;

    /// Partially updates a post: `body` is sent as `{"doc": body}` and merged
    /// into the stored document.
    async fn update(&self, id: Uuid, body: Vec<u8>) -> StorageResult<()>;

    /// Like [`update`](Self::update), but only applies while the stored
    /// document is still at `version`.
    ///
    /// # Errors
    ///
    /// * `StorageError::PreconditionFailed` - the document changed since `version` was read
    async fn update_if_version(
        &self,
        id: Uuid,
        body: Vec<u8>,
        version: DocumentVersion,
    ) -> StorageResult<()>;

    /// Deletes a post by id.
    async fn remove(&self, id: Uuid) -> StorageResult<()>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}
