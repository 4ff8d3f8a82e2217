//! Route configuration for the posts REST API.
//!
//! This module contains the routing configuration that maps HTTP paths
//! to handlers.

pub mod post_routes;

pub use post_routes::create_routes;
