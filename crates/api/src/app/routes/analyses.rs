
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use scenario_core::{AnalysisId, AnalysisRequest};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_analysis).get(list_analyses))
        .route("/sync", post(analyze_sync))
        .route("/:id", get(get_result).delete(delete_analysis))
        .route("/:id/status", get(get_status))
}

pub async fn create_analysis(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AnalysisRequest>,
) -> axum::response::Response {
    match services.create_analysis(body) {
        Ok(summary) => (StatusCode::ACCEPTED, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_analysis_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.get_status(id) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_result(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_analysis_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.get_result(id) {
        Ok(analysis) => (StatusCode::OK, Json(dto::AnalysisResponse::new(id, analysis))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn analyze_sync(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AnalysisRequest>,
) -> axum::response::Response {
    match services.analyze_sync(body).await {
        Ok(analysis) => (
            StatusCode::OK,
            Json(dto::AnalysisResponse::new(AnalysisId::new(), analysis)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_analyses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListAnalysesQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(errors::parse_status).transpose() {
        Ok(status) => status,
        Err(resp) => return resp,
    };

    match services.list_analyses(status, query.limit) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_analysis(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_analysis_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_analysis(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Analysis deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
