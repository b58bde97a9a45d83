
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use scenario_core::AnalysisId;
use scenario_infra::JobStatus;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        ServiceError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        ServiceError::InvalidState { .. } => json_error(StatusCode::CONFLICT, "invalid_state", message),
        ServiceError::InternalInconsistency(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_inconsistency",
            message,
        ),
        ServiceError::AnalysisFailed(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "analysis_failed", message)
        }
        ServiceError::Unavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", message)
        }
        ServiceError::Store(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_analysis_id(s: &str) -> Result<AnalysisId, axum::response::Response> {
    s.parse()
        .map_err(|e: scenario_core::DomainError| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub fn parse_status(s: &str) -> Result<JobStatus, axum::response::Response> {
    s.parse()
        .map_err(|e: scenario_core::DomainError| json_error(StatusCode::BAD_REQUEST, "invalid_status", e.to_string()))
}
