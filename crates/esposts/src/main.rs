//! esposts
//!
//! Posts CRUD service backed by Elasticsearch.

use std::sync::Arc;

use clap::Parser;
use esposts_persistence::backends::elasticsearch::{
    ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig,
};
use esposts_persistence::{DocumentRepository, RepositoryConfig};
use esposts_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

/// Builds the Elasticsearch backend configuration from the server configuration.
fn elasticsearch_config(config: &ServerConfig) -> ElasticsearchConfig {
    let auth = match (
        &config.elasticsearch_username,
        &config.elasticsearch_password,
    ) {
        (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    ElasticsearchConfig {
        nodes: config.es_nodes(),
        index: config.elasticsearch_index.clone(),
        max_result_window: u32::try_from(config.max_results).unwrap_or(u32::MAX),
        request_timeout_ms: config.elasticsearch_timeout_ms,
        auth,
        disable_certificate_validation: config.elasticsearch_disable_cert_validation,
        ..Default::default()
    }
}

/// Connects to Elasticsearch and builds the post repository.
///
/// Fails if the cluster cannot be reached, so the server never starts
/// without a working store client.
async fn create_repository(
    config: &ServerConfig,
) -> anyhow::Result<DocumentRepository<ElasticsearchBackend>> {
    let es_config = elasticsearch_config(config);

    info!(
        nodes = ?es_config.nodes,
        index = %es_config.index,
        "Initializing Elasticsearch backend"
    );

    let backend = ElasticsearchBackend::connect(es_config).await?;

    if config.create_index {
        backend.initialize().await?;
    }

    let repository_config = RepositoryConfig {
        index: config.elasticsearch_index.clone(),
        operation_timeout: config.operation_timeout(),
    };

    Ok(DocumentRepository::new(Arc::new(backend), repository_config))
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        index = %config.elasticsearch_index,
        optimistic_updates = config.optimistic_updates,
        "Starting esposts"
    );

    let repository = create_repository(&config).await?;
    let app = create_app_with_config(repository, config.clone());
    serve(app, &config).await
}
