//! HTTP request handlers for the posts API.
//!
//! - [`list`] - List every post
//! - [`read`] - Read a post by id
//! - [`create`] - Create a post
//! - [`update`] - Partially update a post
//! - [`delete`] - Delete a post
//! - [`health`] - Health check endpoints

pub mod create;
pub mod delete;
pub mod health;
pub mod list;
pub mod read;
pub mod update;

// Re-export handlers for convenience
pub use create::create_handler;
pub use delete::delete_handler;
pub use health::{health_handler, liveness_handler};
pub use list::list_handler;
pub use read::read_handler;
pub use update::update_handler;
