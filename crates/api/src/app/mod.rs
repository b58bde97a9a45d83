//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the operation facade over job store, orchestrator and engine
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use scenario_infra::OrchestratorHandle;

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The returned handle owns the background workers; shut it down after the
/// server stops to let accepted jobs finish.
pub fn build_app(config: &ApiConfig) -> (Router, OrchestratorHandle) {
    let (services, jobs) = services::build_services(config);
    (router(Arc::new(services)), jobs)
}

pub fn router(services: Arc<services::AppServices>) -> Router {
    routes::router().layer(Extension(services))
}
