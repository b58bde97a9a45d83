//! Job storage implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use scenario_core::{AnalysisId, RequestSnapshot};

use super::types::{AnalysisJob, JobStatus, JobUpdate};

/// Job store abstraction.
///
/// Every method is atomic with respect to every other: an `update` is seen by
/// readers either entirely or not at all.
pub trait JobStore: Send + Sync {
    /// Insert a fresh `queued` record and return its id.
    fn create(&self, request: RequestSnapshot) -> Result<AnalysisId, JobStoreError>;

    fn get(&self, id: AnalysisId) -> Result<AnalysisJob, JobStoreError>;

    /// Merge a transition into the record and return the merged record.
    ///
    /// Rejects transitions that would move the status backwards or out of a
    /// terminal state.
    fn update(&self, id: AnalysisId, update: JobUpdate) -> Result<AnalysisJob, JobStoreError>;

    /// Newest first, optionally filtered by status, at most `limit` records.
    fn list(&self, status: Option<JobStatus>, limit: usize) -> Result<Vec<AnalysisJob>, JobStoreError>;

    fn delete(&self, id: AnalysisId) -> Result<(), JobStoreError>;

    fn stats(&self) -> Result<JobStats, JobStoreError>;
}

/// Job store error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobStoreError {
    #[error("analysis not found: {0}")]
    NotFound(AnalysisId),
    #[error("analysis {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: AnalysisId,
        from: JobStatus,
        to: JobStatus,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

/// Per-status record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobStats {
    pub fn total(&self) -> usize {
        self.queued + self.processing + self.completed + self.failed
    }
}

/// Process-local job store. Records live until deleted or the process exits.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<AnalysisId, AnalysisJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn poisoned<T>(_: T) -> JobStoreError {
    JobStoreError::Storage("job store lock poisoned".to_string())
}

impl JobStore for InMemoryJobStore {
    fn create(&self, request: RequestSnapshot) -> Result<AnalysisId, JobStoreError> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let id = AnalysisId::new();
        jobs.insert(id, AnalysisJob::queued(id, request, Utc::now()));
        Ok(id)
    }

    fn get(&self, id: AnalysisId) -> Result<AnalysisJob, JobStoreError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        jobs.get(&id).cloned().ok_or(JobStoreError::NotFound(id))
    }

    fn update(&self, id: AnalysisId, update: JobUpdate) -> Result<AnalysisJob, JobStoreError> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let job = jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;

        let to = update.status();
        if !job.status.can_transition_to(to) {
            return Err(JobStoreError::InvalidTransition {
                id,
                from: job.status,
                to,
            });
        }

        job.apply(update);
        Ok(job.clone())
    }

    fn list(&self, status: Option<JobStatus>, limit: usize) -> Result<Vec<AnalysisJob>, JobStoreError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        let mut result: Vec<_> = jobs
            .values()
            .filter(|j| status.is_none_or(|s| j.status == s))
            .cloned()
            .collect();

        // Ids are time-ordered, so they break created_at ties consistently.
        result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        result.truncate(limit);
        Ok(result)
    }

    fn delete(&self, id: AnalysisId) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        jobs.remove(&id).map(|_| ()).ok_or(JobStoreError::NotFound(id))
    }

    fn stats(&self) -> Result<JobStats, JobStoreError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        let mut stats = JobStats::default();

        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }

        Ok(stats)
    }
}
