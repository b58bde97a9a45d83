
use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Scenario Outcome Analyzer API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.health() {
        Ok(health) => (StatusCode::OK, Json(health)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn models(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(serde_json::json!({ "models": services.list_models() }))
}

pub async fn examples(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(serde_json::json!({ "examples": services.examples() }))
}
