//! Application state for the posts REST API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the post service (and through it the repository) and the
//! server configuration.

use std::sync::Arc;

use esposts_persistence::core::PostRepository;

use crate::config::ServerConfig;
use crate::service::{PostService, ServiceSettings};

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `R` - The repository type (must implement [`PostRepository`])
///
/// # Example
///
/// ```rust,ignore
/// use esposts_rest::{AppState, ServerConfig};
/// use std::sync::Arc;
///
/// let state = AppState::new(Arc::new(repository), ServerConfig::default());
/// ```
pub struct AppState<R> {
    /// The post service.
    service: PostService<R>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since R is wrapped in Arc and doesn't need to be Clone
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: PostRepository> AppState<R> {
    /// Creates a new AppState with the given repository and configuration.
    pub fn new(repository: Arc<R>, config: ServerConfig) -> Self {
        let service = PostService::new(repository, ServiceSettings::from(&config));
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Returns the post service.
    pub fn service(&self) -> &PostService<R> {
        &self.service
    }

    /// Returns a reference to the repository.
    pub fn repository(&self) -> &R {
        self.service.repository()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
