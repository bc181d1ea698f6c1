//! HTTP application wiring.
//!
//! - `services.rs`: ledger backend selection and service construction
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request bodies and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around already-constructed services.
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(Extension(services)),
        )
}
