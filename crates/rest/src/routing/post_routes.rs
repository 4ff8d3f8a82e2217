//! Post route configuration.
//!
//! Defines all routes for the posts API.

use axum::{Router, routing::get};
use esposts_persistence::core::PostRepository;

use crate::handlers;
use crate::state::AppState;

/// Creates all posts API routes.
///
/// # Routes
///
/// ## System-level
/// - `GET /health` - Health check (touches the store)
/// - `GET /_liveness` - Liveness probe
///
/// ## Collection
/// - `GET /posts` - List
/// - `POST /posts` - Create
///
/// ## Instance
/// - `GET /posts/{id}` - Read
/// - `PATCH /posts/{id}` - Update
/// - `DELETE /posts/{id}` - Delete
pub fn create_routes<R>(state: AppState<R>) -> Router
where
    R: PostRepository + 'static,
{
    Router::new()
        // System-level routes
        .route("/health", get(handlers::health_handler::<R>))
        .route("/_liveness", get(handlers::liveness_handler))
        // Collection routes
        .route(
            "/posts",
            get(handlers::list_handler::<R>).post(handlers::create_handler::<R>),
        )
        // Instance routes
        .route(
            "/posts/{id}",
            get(handlers::read_handler::<R>)
                .patch(handlers::update_handler::<R>)
                .delete(handlers::delete_handler::<R>),
        )
        // State
        .with_state(state)
}
