//! Server configuration for the posts REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `POSTS_SERVER_PORT` | 3000 | Server port |
//! | `POSTS_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `POSTS_LOG_LEVEL` | info | Log level |
//! | `POSTS_MAX_BODY_SIZE` | 1048576 | Max request body (bytes) |
//! | `POSTS_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `POSTS_ENABLE_CORS` | true | Enable CORS |
//! | `POSTS_CORS_ORIGINS` | * | Allowed origins |
//! | `POSTS_ES_NODES` | http://localhost:9200 | Elasticsearch node URLs (comma-separated) |
//! | `POSTS_ES_INDEX` | posts | Index holding posts |
//! | `POSTS_ES_USERNAME` | - | Basic auth username |
//! | `POSTS_ES_PASSWORD` | - | Basic auth password |
//! | `POSTS_ES_TIMEOUT_MS` | 30000 | Transport timeout (milliseconds) |
//! | `POSTS_ES_DISABLE_CERT_VALIDATION` | false | Skip TLS certificate validation |
//! | `POSTS_ES_CREATE_INDEX` | true | Create the index with its mapping at startup |
//! | `POSTS_OPERATION_TIMEOUT_MS` | 10000 | Bound on one repository round trip (milliseconds) |
//! | `POSTS_OPTIMISTIC_UPDATES` | true | Guard updates with the document version |
//! | `POSTS_MAX_RESULTS` | 10000 | Size of the list-all query |
//!
//! # Example
//!
//! ```rust
//! use esposts_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 8080,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use clap::Parser;

/// Server configuration for the posts REST API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "esposts")]
#[command(about = "Posts CRUD service backed by Elasticsearch")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "POSTS_SERVER_PORT", default_value = "3000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "POSTS_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "POSTS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "POSTS_MAX_BODY_SIZE", default_value = "1048576")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "POSTS_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "POSTS_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "POSTS_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(long, env = "POSTS_ES_NODES", default_value = "http://localhost:9200")]
    pub elasticsearch_nodes: String,

    /// Index holding posts.
    #[arg(long, env = "POSTS_ES_INDEX", default_value = "posts")]
    pub elasticsearch_index: String,

    /// Elasticsearch basic auth username.
    #[arg(long, env = "POSTS_ES_USERNAME")]
    pub elasticsearch_username: Option<String>,

    /// Elasticsearch basic auth password.
    #[arg(long, env = "POSTS_ES_PASSWORD")]
    pub elasticsearch_password: Option<String>,

    /// Elasticsearch transport timeout in milliseconds.
    #[arg(long, env = "POSTS_ES_TIMEOUT_MS", default_value = "30000")]
    pub elasticsearch_timeout_ms: u64,

    /// Disable TLS certificate validation (development only).
    #[arg(long, env = "POSTS_ES_DISABLE_CERT_VALIDATION", default_value = "false")]
    pub elasticsearch_disable_cert_validation: bool,

    /// Create the posts index with its mapping at startup if it is missing.
    #[arg(long, env = "POSTS_ES_CREATE_INDEX", default_value = "true")]
    pub create_index: bool,

    /// Upper bound on one repository round trip, in milliseconds.
    #[arg(long, env = "POSTS_OPERATION_TIMEOUT_MS", default_value = "10000")]
    pub operation_timeout_ms: u64,

    /// Guard updates with the version read before the write.
    #[arg(long, env = "POSTS_OPTIMISTIC_UPDATES", default_value = "true")]
    pub optimistic_updates: bool,

    /// Maximum number of posts returned by the list endpoint.
    #[arg(long, env = "POSTS_MAX_RESULTS", default_value = "10000")]
    pub max_results: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_index: "posts".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
            elasticsearch_timeout_ms: 30000,
            elasticsearch_disable_cert_validation: false,
            create_index: true,
            operation_timeout_ms: 10000,
            optimistic_updates: true,
            max_results: 10000,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the configured Elasticsearch nodes, trimmed and without blanks.
    pub fn es_nodes(&self) -> Vec<String> {
        self.elasticsearch_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the bound on one repository round trip.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.es_nodes().is_empty() {
            errors.push("At least one Elasticsearch node is required".to_string());
        }

        if self.elasticsearch_index.trim().is_empty() {
            errors.push("Elasticsearch index cannot be empty".to_string());
        }

        if self.elasticsearch_username.is_some() != self.elasticsearch_password.is_some() {
            errors.push(
                "Elasticsearch username and password must be set together".to_string(),
            );
        }

        if self.operation_timeout_ms == 0 {
            errors.push("Operation timeout cannot be 0".to_string());
        }

        if self.max_results == 0 {
            errors.push("Max results cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            log_level: "debug".to_string(),
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            create_index: false,
            operation_timeout_ms: 1000,
            max_results: 100,
            ..Default::default()
        }
    }
}
