//! Background analysis jobs.
//!
//! ## Components
//!
//! - `AnalysisJob`: lifecycle record with status, request snapshot and outcome
//! - `JobStore`: atomic keyed storage for job records (in-memory today)
//! - `JobOrchestrator`: runs submitted jobs on a bounded worker pool and
//!   writes their transitions back through a single writer task

pub mod orchestrator;
pub mod store;
pub mod types;

pub use orchestrator::{
    JobOrchestrator, OrchestratorConfig, OrchestratorError, OrchestratorHandle, MAX_CONCURRENT_LIMIT,
};
pub use store::{InMemoryJobStore, JobStats, JobStore, JobStoreError};
pub use types::{AnalysisJob, JobStatus, JobSummary, JobUpdate};
