
use axum::{routing::get, Router};

pub mod analyses;
pub mod system;

/// Router for every endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/models", get(system::models))
        .route("/examples", get(system::examples))
        .nest("/analyze", analyses::router())
}
