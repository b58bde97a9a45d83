//! Service facade over the analysis pipeline.
//!
//! Every HTTP route maps onto exactly one method here; the handlers only
//! translate between JSON and these calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scenario_ai::{
    example_scenarios, list_models, AiError, EngineFactory, ExampleScenario, ModelInfo,
    ProviderEngineFactory,
};
use scenario_core::{AnalysisId, AnalysisRequest, ScenarioAnalysis};
use scenario_infra::{
    InMemoryJobStore, JobOrchestrator, JobStats, JobStatus, JobStore, JobStoreError, JobSummary,
    OrchestratorConfig, OrchestratorHandle,
};

use crate::config::ApiConfig;

pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Errors surfaced to the HTTP layer. Each kind maps to a distinct response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("analysis not found: {0}")]
    NotFound(AnalysisId),

    #[error("analysis {id} is not completed (status: {status})")]
    InvalidState { id: AnalysisId, status: JobStatus },

    #[error("analysis {0} is completed but has no stored result")]
    InternalInconsistency(AnalysisId),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("analysis workers unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Store(JobStoreError),
}

impl From<JobStoreError> for ServiceError {
    fn from(e: JobStoreError) -> Self {
        match e {
            JobStoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

impl From<AiError> for ServiceError {
    fn from(e: AiError) -> Self {
        ServiceError::AnalysisFailed(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub active_analyses: usize,
    pub jobs: JobStats,
}

pub struct AppServices {
    store: Arc<dyn JobStore>,
    engines: Arc<dyn EngineFactory>,
    orchestrator: JobOrchestrator,
}

/// Wire the in-memory store, the provider-backed engine factory and a running
/// orchestrator. Must be called inside a tokio runtime.
pub fn build_services(config: &ApiConfig) -> (AppServices, OrchestratorHandle) {
    let store: Arc<dyn JobStore> = InMemoryJobStore::arc();
    let engines: Arc<dyn EngineFactory> = Arc::new(ProviderEngineFactory::new(config.provider.clone()));
    AppServices::spawn(
        store,
        engines,
        OrchestratorConfig::default().with_max_concurrent(config.max_concurrent_jobs),
    )
}

impl AppServices {
    pub fn spawn(
        store: Arc<dyn JobStore>,
        engines: Arc<dyn EngineFactory>,
        config: OrchestratorConfig,
    ) -> (Self, OrchestratorHandle) {
        let (orchestrator, handle) =
            JobOrchestrator::spawn(Arc::clone(&store), Arc::clone(&engines), config);
        (
            Self {
                store,
                engines,
                orchestrator,
            },
            handle,
        )
    }

    /// Record a queued job and hand it to the orchestrator.
    pub fn create_analysis(&self, request: AnalysisRequest) -> Result<JobSummary, ServiceError> {
        let id = self.store.create(request.snapshot())?;
        let summary = self.store.get(id)?.summary();

        if let Err(e) = self.orchestrator.submit(id, request) {
            // Never leave a queued record that nothing will run.
            if let Err(rollback) = self.store.delete(id) {
                tracing::warn!(
                    job_id = %id,
                    error = %rollback,
                    "failed to remove unsubmitted analysis; record stays queued"
                );
            }
            return Err(ServiceError::Unavailable(e.to_string()));
        }

        tracing::debug!(job_id = %id, "analysis queued");
        Ok(summary)
    }

    pub fn get_status(&self, id: AnalysisId) -> Result<JobSummary, ServiceError> {
        Ok(self.store.get(id)?.summary())
    }

    pub fn get_result(&self, id: AnalysisId) -> Result<ScenarioAnalysis, ServiceError> {
        let job = self.store.get(id)?;
        match job.status {
            JobStatus::Completed => job.result.ok_or_else(|| {
                tracing::error!(job_id = %id, "completed job has no result");
                ServiceError::InternalInconsistency(id)
            }),
            status => Err(ServiceError::InvalidState { id, status }),
        }
    }

    /// Run the pipeline inline. No job record is created.
    pub async fn analyze_sync(&self, request: AnalysisRequest) -> Result<ScenarioAnalysis, ServiceError> {
        let engine = self.engines.build(request.credentials(), &request.model)?;
        let analysis = engine
            .analyze(&request.situation, request.context.as_ref())
            .await?;
        Ok(analysis)
    }

    pub fn list_analyses(
        &self,
        status: Option<JobStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<JobSummary>, ServiceError> {
        let jobs = self.store.list(status, limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
        Ok(jobs.iter().map(|j| j.summary()).collect())
    }

    pub fn delete_analysis(&self, id: AnalysisId) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        tracing::debug!(job_id = %id, "analysis deleted");
        Ok(())
    }

    pub fn list_models(&self) -> Vec<ModelInfo> {
        list_models()
    }

    pub fn examples(&self) -> Vec<ExampleScenario> {
        example_scenarios()
    }

    pub fn health(&self) -> Result<Health, ServiceError> {
        let jobs = self.store.stats()?;
        Ok(Health {
            status: "healthy",
            timestamp: Utc::now(),
            active_analyses: jobs.processing,
            jobs,
        })
    }
}
