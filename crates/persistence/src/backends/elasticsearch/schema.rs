//! Elasticsearch index schema and mapping definitions.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Operation, StorageError, StorageResult};

use super::backend::{ElasticsearchBackend, ElasticsearchConfig, unavailable};

/// Creates the index body (settings and mapping) for posts.
///
/// Timestamps accept both ISO 8601 strings and epoch milliseconds so documents
/// written by older clients remain valid.
pub fn create_index_mapping(config: &ElasticsearchConfig) -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "index.max_result_window": config.max_result_window,
            "refresh_interval": config.refresh_interval
        },
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "keyword": { "type": "keyword", "ignore_above": 256 }
                    }
                },
                "done": { "type": "boolean" },
                "created": {
                    "type": "date",
                    "format": "strict_date_optional_time||epoch_millis"
                },
                "updated": {
                    "type": "date",
                    "format": "strict_date_optional_time||epoch_millis"
                }
            }
        }
    })
}

/// Ensures the posts index exists, creating it with its mapping if necessary.
pub async fn ensure_index(backend: &ElasticsearchBackend) -> StorageResult<()> {
    let index = backend.index();

    let exists_response = backend
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[index]))
        .send()
        .await
        .map_err(|e| unavailable(Operation::CreateIndex, e))?;

    if exists_response.status_code().is_success() {
        debug!(index = %index, "Elasticsearch index already exists");
        return Ok(());
    }

    let mapping = create_index_mapping(backend.config());

    let response = backend
        .client()
        .indices()
        .create(IndicesCreateParts::Index(index))
        .body(mapping)
        .send()
        .await
        .map_err(|e| unavailable(Operation::CreateIndex, e))?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Another instance created it between the check and the create
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        return Err(StorageError::Backend {
            operation: Operation::CreateIndex,
            target: index.to_string(),
            status: status.as_u16(),
            message: body,
        });
    }

    info!(index = %index, "Created Elasticsearch index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_mapping_structure() {
        let config = ElasticsearchConfig::default();
        let mapping = create_index_mapping(&config);

        assert_eq!(mapping["settings"]["number_of_shards"], 1);
        assert_eq!(mapping["settings"]["number_of_replicas"], 1);
        assert_eq!(mapping["settings"]["index.max_result_window"], 10000);

        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["id"]["type"], "keyword");
        assert_eq!(props["title"]["type"], "text");
        assert_eq!(props["title"]["fields"]["keyword"]["type"], "keyword");
        assert_eq!(props["done"]["type"], "boolean");
        assert_eq!(props["created"]["type"], "date");
        assert_eq!(
            props["updated"]["format"],
            "strict_date_optional_time||epoch_millis"
        );
    }

    #[test]
    fn test_mapping_follows_config() {
        let config = ElasticsearchConfig {
            number_of_shards: 3,
            number_of_replicas: 0,
            refresh_interval: "5s".to_string(),
            ..Default::default()
        };
        let mapping = create_index_mapping(&config);
        assert_eq!(mapping["settings"]["number_of_shards"], 3);
        assert_eq!(mapping["settings"]["number_of_replicas"], 0);
        assert_eq!(mapping["settings"]["refresh_interval"], "5s");
    }
}
