//! # esposts-rest - Posts REST API
//!
//! This crate exposes CRUD operations on posts over HTTP, on top of any
//! [`PostRepository`] from `esposts-persistence`. In production that is a
//! [`DocumentRepository`](esposts_persistence::DocumentRepository) over
//! Elasticsearch; tests plug in an in-memory repository.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use esposts_persistence::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//! use esposts_persistence::{DocumentRepository, RepositoryConfig};
//! use esposts_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = ElasticsearchBackend::connect(ElasticsearchConfig::default()).await?;
//!     backend.initialize().await?;
//!
//!     let repository = DocumentRepository::new(Arc::new(backend), RepositoryConfig::default());
//!     let app = create_app_with_config(repository, ServerConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern | `message` |
//! |-----------|-------------|-------------|-----------|
//! | list | GET | `/posts` | Posts fetched |
//! | create | POST | `/posts` | Post added |
//! | read | GET | `/posts/{id}` | Post fetched |
//! | update | PATCH | `/posts/{id}` | Post updated |
//! | delete | DELETE | `/posts/{id}` | Post removed |
//! | health | GET | `/health` | - |
//! | liveness | GET | `/_liveness` | - |
//!
//! ## Response Envelope
//!
//! Every posts endpoint answers with the same shape:
//!
//! ```json
//! { "data": [ ... ], "message": "Posts fetched", "errors": [] }
//! ```
//!
//! On failure `data` is `null`, `message` is `"error occurred"` and `errors`
//! holds one message. See [`error`] for the status mapping.
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration
//! - [`error`] - Error types and status mapping
//! - [`extractors`] - Path id and body extractors
//! - [`handlers`] - HTTP request handlers
//! - [`responses`] - Response envelope
//! - [`routing`] - Route configuration
//! - [`service`] - Post service between handlers and the repository
//! - [`state`] - Application state
//! - [`types`] - Input and output shapes of a post

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod service;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use responses::Envelope;
pub use service::{PostService, ServiceSettings};
pub use state::AppState;
pub use types::{PostInput, PostPayload};

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode};
use esposts_persistence::core::PostRepository;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<R>(repository: R) -> Router
where
    R: PostRepository + 'static,
{
    create_app_with_config(repository, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Sets up the posts routes with tracing, request timeout, body limit and
/// (when enabled) CORS.
///
/// # Example
///
/// ```rust,ignore
/// use esposts_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     port: 8080,
///     enable_cors: false,
///     ..Default::default()
/// };
/// let app = create_app_with_config(repository, config);
/// ```
pub fn create_app_with_config<R>(repository: R, config: ServerConfig) -> Router
where
    R: PostRepository + 'static,
{
    info!(
        backend = repository.backend_name(),
        "Creating posts REST API"
    );

    let max_body_size = config.max_body_size;
    let request_timeout = Duration::from_secs(config.request_timeout);
    let cors = config.enable_cors.then(|| build_cors_layer(&config));

    let state = AppState::new(Arc::new(repository), config);
    let router = routing::create_routes(state).layer(DefaultBodyLimit::max(max_body_size));

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins.trim() == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "esposts_rest={level},esposts_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
