//! Elasticsearch backend implementation.

use std::fmt::Debug;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Operation, StorageError, StorageResult};
use crate::repository::DEFAULT_INDEX;

pub(crate) const BACKEND_NAME: &str = "elasticsearch";

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Index holding posts (default: `"posts"`).
    #[serde(default = "default_index")]
    pub index: String,

    /// Number of primary shards when the index is created (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards when the index is created (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Refresh interval (default: "1s").
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Maximum result window size (default: 10000).
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u32,

    /// Transport request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

fn default_max_result_window() -> u32 {
    10000
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            index: default_index(),
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
            max_result_window: default_max_result_window(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// Elasticsearch client handle.
///
/// Built once at startup and shared for the life of the process. The
/// underlying HTTP transport manages its own connections and is safe for
/// concurrent use.
pub struct ElasticsearchBackend {
    /// The Elasticsearch client.
    client: Elasticsearch,
    /// Configuration.
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchBackend {
    /// Creates a new backend with the given configuration.
    ///
    /// This only builds the client; nothing is sent over the network.
    pub fn new(config: ElasticsearchConfig) -> StorageResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Creates a backend and verifies the cluster answers.
    ///
    /// Intended for startup: any failure here should abort the process.
    pub async fn connect(config: ElasticsearchConfig) -> StorageResult<Self> {
        let backend = Self::new(config)?;
        let info = backend.info().await?;

        info!(
            cluster = info
                .get("cluster_name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            version = info
                .get("version")
                .and_then(|v| v.get("number"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            "Connected to Elasticsearch"
        );

        Ok(backend)
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ElasticsearchConfig) -> StorageResult<Elasticsearch> {
        if config.nodes.len() > 1 {
            warn!(
                nodes = ?config.nodes,
                "Multiple Elasticsearch nodes configured, only the first is used"
            );
        }

        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| invalid_configuration(format!("Invalid URL '{}': {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder
            .build()
            .map_err(|e| invalid_configuration(format!("Failed to build transport: {}", e)))?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the Elasticsearch client.
    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Returns the index holding posts.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    /// Fetches the cluster info document (`GET /`).
    pub async fn info(&self) -> StorageResult<Value> {
        let response = self
            .client
            .info()
            .send()
            .await
            .map_err(|e| unavailable(Operation::Info, e))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend {
                operation: Operation::Info,
                target: "/".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StorageError::MalformedResponse {
                operation: Operation::Info,
                message: e.to_string(),
            })
    }

    /// Creates the posts index with its mapping if it does not exist yet.
    pub async fn initialize(&self) -> StorageResult<()> {
        super::schema::ensure_index(self).await
    }
}

pub(crate) fn unavailable(operation: Operation, error: elasticsearch::Error) -> StorageError {
    StorageError::BackendUnavailable {
        backend_name: BACKEND_NAME.to_string(),
        operation,
        message: error.to_string(),
    }
}

fn invalid_configuration(message: String) -> StorageError {
    StorageError::InvalidConfiguration {
        backend_name: BACKEND_NAME.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.index, "posts");
        assert_eq!(config.number_of_shards, 1);
        assert_eq!(config.number_of_replicas, 1);
        assert_eq!(config.request_timeout_ms, 30000);
        assert_eq!(config.nodes, vec!["http://localhost:9200"]);
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let config: ElasticsearchConfig =
            serde_json::from_str(r#"{"nodes": ["http://es:9200"]}"#).unwrap();
        assert_eq!(config.nodes, vec!["http://es:9200"]);
        assert_eq!(config.index, "posts");
        assert!(config.auth.is_none());
        assert!(!config.disable_certificate_validation);
    }

    #[test]
    fn test_new_does_not_connect() {
        let backend = ElasticsearchBackend::new(ElasticsearchConfig::default()).unwrap();
        assert_eq!(backend.index(), "posts");
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let config = ElasticsearchConfig {
            nodes: vec!["not a url".to_string()],
            ..Default::default()
        };
        let err = ElasticsearchBackend::new(config).unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_auth_configurations_build() {
        let basic = ElasticsearchConfig {
            auth: Some(ElasticsearchAuth::Basic {
                username: "elastic".to_string(),
                password: "changeme".to_string(),
            }),
            ..Default::default()
        };
        assert!(ElasticsearchBackend::new(basic).is_ok());

        let bearer = ElasticsearchConfig {
            auth: Some(ElasticsearchAuth::Bearer {
                token: "abc".to_string(),
            }),
            ..Default::default()
        };
        assert!(ElasticsearchBackend::new(bearer).is_ok());
    }
}
