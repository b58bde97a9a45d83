//! Infrastructure layer: job storage and background execution.

pub mod jobs;

pub use jobs::{
    AnalysisJob, InMemoryJobStore, JobOrchestrator, JobStats, JobStatus, JobStore, JobStoreError,
    JobSummary, JobUpdate, OrchestratorConfig, OrchestratorError, OrchestratorHandle,
    MAX_CONCURRENT_LIMIT,
};
