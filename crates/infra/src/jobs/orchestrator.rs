//! Background execution of submitted analyses.
//!
//! A dispatcher task receives submissions over a channel and starts one worker
//! per job, bounded by a semaphore. Workers never touch the store directly:
//! every transition is sent to a single writer task, which applies it and
//! acknowledges. A job's transitions are therefore applied in the order its
//! worker sent them.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use scenario_ai::EngineFactory;
use scenario_core::{AnalysisId, AnalysisRequest};

use super::store::{JobStore, JobStoreError};
use super::types::{AnalysisJob, JobUpdate};

/// Largest usable `max_concurrent`: bounded by the semaphore and by the
/// single `acquire_many` that drains it.
pub const MAX_CONCURRENT_LIMIT: usize = if Semaphore::MAX_PERMITS < u32::MAX as usize {
    Semaphore::MAX_PERMITS
} else {
    u32::MAX as usize
};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum engine executions running at once
    pub max_concurrent: usize,
    /// Name for logging
    pub name: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            name: "analysis-orchestrator".to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("orchestrator is shut down")]
    ShutDown,
}

struct Submission {
    id: AnalysisId,
    request: AnalysisRequest,
}

struct Write {
    id: AnalysisId,
    update: JobUpdate,
    ack: oneshot::Sender<Result<AnalysisJob, JobStoreError>>,
}

/// Submission side of the orchestrator. Cheap to clone.
#[derive(Clone)]
pub struct JobOrchestrator {
    submissions: mpsc::UnboundedSender<Submission>,
}

/// Handle to stop a running orchestrator.
#[derive(Debug)]
pub struct OrchestratorHandle {
    shutdown: oneshot::Sender<()>,
    dispatcher: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Stop accepting submissions, run everything already accepted, and wait
    /// for the last transition to be written.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.dispatcher.await {
            warn!(error = %e, "orchestrator dispatcher ended abnormally");
        }
    }
}

impl JobOrchestrator {
    /// Start the dispatcher and writer tasks on the current tokio runtime.
    pub fn spawn(
        store: Arc<dyn JobStore>,
        engines: Arc<dyn EngineFactory>,
        config: OrchestratorConfig,
    ) -> (Self, OrchestratorHandle) {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let writer = tokio::spawn(write_loop(store, write_rx));
        let worker = Worker {
            engines,
            writes: write_tx,
        };
        let dispatcher = tokio::spawn(dispatch_loop(
            config, submit_rx, shutdown_rx, worker, writer,
        ));

        (
            Self {
                submissions: submit_tx,
            },
            OrchestratorHandle {
                shutdown: shutdown_tx,
                dispatcher,
            },
        )
    }

    /// Schedule a job that already exists in the store with status `queued`.
    ///
    /// Returns as soon as the job is enqueued. Each id must be submitted once.
    pub fn submit(&self, id: AnalysisId, request: AnalysisRequest) -> Result<(), OrchestratorError> {
        self.submissions
            .send(Submission { id, request })
            .map_err(|_| OrchestratorError::ShutDown)
    }
}

async fn dispatch_loop(
    config: OrchestratorConfig,
    mut submissions: mpsc::UnboundedReceiver<Submission>,
    mut shutdown: oneshot::Receiver<()>,
    worker: Worker,
    writer: JoinHandle<()>,
) {
    let max_concurrent = config.max_concurrent.clamp(1, MAX_CONCURRENT_LIMIT);
    let permits = Arc::new(Semaphore::new(max_concurrent));
    let mut shutdown_pending = true;

    info!(orchestrator = %config.name, max_concurrent, "job orchestrator started");

    loop {
        tokio::select! {
            biased;
            signal = &mut shutdown, if shutdown_pending => {
                shutdown_pending = false;
                // A dropped handle is not a shutdown request.
                if signal.is_ok() {
                    debug!(orchestrator = %config.name, "draining accepted submissions");
                    submissions.close();
                }
            }
            next = submissions.recv() => {
                let Some(submission) = next else { break };
                let Ok(permit) = permits.clone().acquire_owned().await else { break };
                tokio::spawn(worker.clone().run(submission, permit));
            }
        }
    }

    // Every worker holds a permit until its final transition is acknowledged.
    if permits.acquire_many(max_concurrent as u32).await.is_err() {
        warn!(orchestrator = %config.name, "worker permits closed before drain");
    }
    drop(worker);
    if let Err(e) = writer.await {
        warn!(orchestrator = %config.name, error = %e, "job writer ended abnormally");
    }

    info!(orchestrator = %config.name, "job orchestrator stopped");
}

/// Single owner of store writes.
async fn write_loop(store: Arc<dyn JobStore>, mut writes: mpsc::UnboundedReceiver<Write>) {
    while let Some(Write { id, update, ack }) = writes.recv().await {
        let to = update.status();
        let result = store.update(id, update);
        match &result {
            Ok(_) => debug!(job_id = %id, status = %to, "job transitioned"),
            Err(e) => warn!(job_id = %id, status = %to, error = %e, "job transition rejected"),
        }
        let _ = ack.send(result);
    }
}

#[derive(Clone)]
struct Worker {
    engines: Arc<dyn EngineFactory>,
    writes: mpsc::UnboundedSender<Write>,
}

impl Worker {
    async fn transition(&self, id: AnalysisId, update: JobUpdate) -> Result<AnalysisJob, JobStoreError> {
        let (ack, acked) = oneshot::channel();
        self.writes
            .send(Write { id, update, ack })
            .map_err(|_| JobStoreError::Storage("job writer stopped".to_string()))?;
        acked
            .await
            .map_err(|_| JobStoreError::Storage("job writer dropped the transition".to_string()))?
    }

    async fn run(self, submission: Submission, _permit: OwnedSemaphorePermit) {
        let Submission { id, request } = submission;

        // Deleted or already started: nothing to run.
        if self.transition(id, JobUpdate::Processing).await.is_err() {
            return;
        }

        // Run in its own task so a panic in the engine still fails the job.
        let engines = Arc::clone(&self.engines);
        let model = request.model.clone();
        let analysis = tokio::spawn(async move {
            let engine = engines.build(request.credentials(), &request.model)?;
            engine
                .analyze(&request.situation, request.context.as_ref())
                .await
        })
        .await;

        let update = match analysis {
            Ok(Ok(result)) => {
                info!(job_id = %id, model = %model, source = ?result.outcome_source, "analysis completed");
                JobUpdate::completed(result, Utc::now())
            }
            Ok(Err(e)) => {
                warn!(job_id = %id, model = %model, error = %e, "analysis failed");
                JobUpdate::failed(e.to_string(), Utc::now())
            }
            Err(e) => {
                warn!(job_id = %id, model = %model, error = %e, "analysis task aborted");
                JobUpdate::failed(format!("analysis task aborted: {e}"), Utc::now())
            }
        };

        let _ = self.transition(id, update).await;
    }
}
