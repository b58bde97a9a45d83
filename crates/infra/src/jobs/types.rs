//! Job lifecycle types.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scenario_core::{AnalysisId, DomainError, RequestSnapshot, ScenarioAnalysis};

/// Job execution status.
///
/// Moves strictly forward: `Queued -> Processing -> {Completed | Failed}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, waiting for a worker
    Queued,
    /// Engine is running
    Processing,
    /// Result stored
    Completed,
    /// Error stored
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown job status {s:?} (expected queued, processing, completed or failed)"
                ))
            })
    }
}

/// Lifecycle record of one background analysis.
///
/// `completed_at` is set iff the status is terminal; `result` iff completed;
/// `error` iff failed. The store maintains this through [`JobUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: AnalysisId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: RequestSnapshot,
    pub result: Option<ScenarioAnalysis>,
    pub error: Option<String>,
}

impl AnalysisJob {
    pub fn queued(id: AnalysisId, request: RequestSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            created_at,
            completed_at: None,
            request,
            result: None,
            error: None,
        }
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            analysis_id: self.id,
            status: self.status,
            created_at: self.created_at,
            completed_at: self.completed_at,
            error: self.error.clone(),
        }
    }

    /// Apply an update in place. The caller has already checked the transition.
    pub(crate) fn apply(&mut self, update: JobUpdate) {
        self.status = update.status();
        match update {
            JobUpdate::Processing => {}
            JobUpdate::Completed {
                result,
                completed_at,
            } => {
                self.result = Some(*result);
                self.completed_at = Some(completed_at);
            }
            JobUpdate::Failed {
                error,
                completed_at,
            } => {
                self.error = Some(error);
                self.completed_at = Some(completed_at);
            }
        }
    }
}

/// The fields one transition merges into a record.
///
/// Each variant carries exactly the fields its target status requires, so a
/// merged record can never have a terminal status without its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Processing,
    Completed {
        result: Box<ScenarioAnalysis>,
        completed_at: DateTime<Utc>,
    },
    Failed {
        error: String,
        completed_at: DateTime<Utc>,
    },
}

impl JobUpdate {
    pub fn completed(result: ScenarioAnalysis, completed_at: DateTime<Utc>) -> Self {
        Self::Completed {
            result: Box::new(result),
            completed_at,
        }
    }

    pub fn failed(error: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self::Failed {
            error: error.into(),
            completed_at,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            JobUpdate::Processing => JobStatus::Processing,
            JobUpdate::Completed { .. } => JobStatus::Completed,
            JobUpdate::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// Status view of a job, without request or result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub analysis_id: AnalysisId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
