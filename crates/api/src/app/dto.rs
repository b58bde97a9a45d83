use serde::{Deserialize, Serialize};

use scenario_core::{AnalysisId, ScenarioAnalysis};

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /analyze`.
#[derive(Debug, Default, Deserialize)]
pub struct ListAnalysesQuery {
    pub limit: Option<usize>,
    pub status: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// A finished analysis with the id it is addressed by.
///
/// The sync path has no stored job; its id is fresh and not retrievable.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: AnalysisId,
    #[serde(flatten)]
    pub analysis: ScenarioAnalysis,
}

impl AnalysisResponse {
    pub fn new(analysis_id: AnalysisId, analysis: ScenarioAnalysis) -> Self {
        Self {
            analysis_id,
            analysis,
        }
    }
}
