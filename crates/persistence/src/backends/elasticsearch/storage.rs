//! DocumentStore implementation for Elasticsearch.

use async_trait::async_trait;
use bytes::Bytes;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::http::response::Response;
use elasticsearch::{DeleteParts, GetParts, IndexParts, SearchParts, UpdateParts};
use serde_json::Value;
use serde_json::value::RawValue;
use tracing::warn;

use crate::core::{DocumentStore, ResponseBody, StoreRequest, StoreResponse};
use crate::error::{Operation, StorageError, StorageResult};

use super::backend::{BACKEND_NAME, ElasticsearchBackend, unavailable};

/// Body of an Elasticsearch HTTP response, read at most once.
///
/// Holds the live response until it is read or dropped.
struct EsResponseBody {
    operation: Operation,
    response: Option<Response>,
}

#[async_trait]
impl ResponseBody for EsResponseBody {
    async fn read_to_end(&mut self) -> StorageResult<Bytes> {
        match self.response.take() {
            Some(response) => response
                .bytes()
                .await
                .map_err(|e| unavailable(self.operation, e)),
            None => Ok(Bytes::new()),
        }
    }
}

/// Parses an outgoing body so the client sends it verbatim.
fn raw_json(operation: Operation, body: &[u8]) -> StorageResult<Box<RawValue>> {
    serde_json::from_slice(body).map_err(|e| StorageError::Serialization {
        message: format!("{} body is not valid JSON: {}", operation, e),
    })
}

#[async_trait]
impl DocumentStore for ElasticsearchBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn execute(&self, request: StoreRequest) -> StorageResult<StoreResponse> {
        let operation = request.operation();
        let client = self.client();

        let sent = match &request {
            StoreRequest::Get { index, id } => client.get(GetParts::IndexId(index, id)).send().await,
            StoreRequest::Search { index, body } => {
                client
                    .search(SearchParts::Index(&[index.as_str()]))
                    .body(raw_json(operation, body)?)
                    .send()
                    .await
            }
            StoreRequest::Index { index, id, body } => {
                client
                    .index(IndexParts::IndexId(index, id))
                    .body(raw_json(operation, body)?)
                    .send()
                    .await
            }
            StoreRequest::Update {
                index,
                id,
                body,
                if_version,
            } => {
                let mut update = client
                    .update(UpdateParts::IndexId(index, id))
                    .body(raw_json(operation, body)?);
                if let Some(version) = if_version {
                    update = update
                        .if_seq_no(version.seq_no)
                        .if_primary_term(version.primary_term);
                }
                update.send().await
            }
            StoreRequest::Delete { index, id } => {
                client.delete(DeleteParts::IndexId(index, id)).send().await
            }
        };

        let response = sent.map_err(|e| unavailable(operation, e))?;
        let status = response.status_code().as_u16();

        Ok(StoreResponse::new(
            status,
            EsResponseBody {
                operation,
                response: Some(response),
            },
        ))
    }

    async fn health_check(&self) -> StorageResult<()> {
        let response = self
            .client()
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| unavailable(Operation::Health, e))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend {
                operation: Operation::Health,
                target: "_cluster/health".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StorageError::MalformedResponse {
                operation: Operation::Health,
                message: e.to_string(),
            })?;

        match body.get("status").and_then(|s| s.as_str()) {
            Some("red") => {
                warn!("Elasticsearch cluster health is red");
                Err(StorageError::BackendUnavailable {
                    backend_name: BACKEND_NAME.to_string(),
                    operation: Operation::Health,
                    message: "cluster health is red".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
