//! Health check endpoint handlers.
//!
//! Provides health endpoints for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use esposts_persistence::core::PostRepository;
use tracing::{debug, warn};

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Checks that the store is reachable and healthy.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// - `200 OK` - Server and store are healthy
/// - `503 Service Unavailable` - The store is unreachable or unhealthy
pub async fn health_handler<R>(State(state): State<AppState<R>>) -> Response
where
    R: PostRepository + 'static,
{
    debug!("Processing health check request");

    let backend_name = state.repository().backend_name();
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.repository().health_check().await {
        Ok(()) => {
            let body = serde_json::json!({
                "status": "healthy",
                "backend": backend_name,
                "timestamp": timestamp
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Health check failed");
            let body = serde_json::json!({
                "status": "unhealthy",
                "backend": backend_name,
                "error": e.to_string(),
                "timestamp": timestamp
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// Handler for the liveness probe.
///
/// Answers as long as the process serves HTTP; does not touch the store.
///
/// # HTTP Request
///
/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
