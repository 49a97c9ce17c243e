//! Job queue contract: accept a job, run its handler once, report the
//! outcome exactly once.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Worker side: turns one input into one output.
#[async_trait]
pub trait JobHandler<I, O>: Send + Sync {
    async fn run(&self, job_id: &JobId, input: I) -> GitgateResult<O>;
}

/// Submitter side: told how each job ended, once.
#[async_trait]
pub trait JobListener<O>: Send + Sync {
    async fn on_completed(&self, job_id: &JobId, output: O);

    async fn on_failed(&self, job_id: &JobId, error: &GitgateError);
}

#[async_trait]
pub trait JobQueue<I: Send + 'static>: Send + Sync {
    /// Queues `input` under a caller-chosen id.
    async fn enqueue(&self, job_id: JobId, input: I) -> GitgateResult<()>;

    /// Queues `input` under a fresh id.
    async fn submit(&self, input: I) -> GitgateResult<JobId> {
        let job_id = JobId::new();
        self.enqueue(job_id.clone(), input).await?;
        Ok(job_id)
    }
}

/// Runs each job on its own tokio task in the current process.
pub struct InProcessJobQueue<I, O> {
    name: String,
    handler: Arc<dyn JobHandler<I, O>>,
    listener: Arc<dyn JobListener<O>>,
}

impl<I, O> InProcessJobQueue<I, O> {
    pub fn new(
        name: impl Into<String>,
        handler: Arc<dyn JobHandler<I, O>>,
        listener: Arc<dyn JobListener<O>>,
    ) -> Self {
        Self {
            name: name.into(),
            handler,
            listener,
        }
    }
}

#[async_trait]
impl<I, O> JobQueue<I> for InProcessJobQueue<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    async fn enqueue(&self, job_id: JobId, input: I) -> GitgateResult<()> {
        let handler = Arc::clone(&self.handler);
        let listener = Arc::clone(&self.listener);
        let queue = self.name.clone();
        debug!(queue = %queue, job_id = %job_id, "Job queued");

        tokio::spawn(async move {
            let run_id = job_id.clone();
            // A panicking handler surfaces as a JoinError and is still reported
            let outcome = tokio::spawn(async move { handler.run(&run_id, input).await }).await;
            match outcome {
                Ok(Ok(output)) => {
                    info!(queue = %queue, job_id = %job_id, "Job completed");
                    listener.on_completed(&job_id, output).await;
                }
                Ok(Err(e)) => {
                    error!(queue = %queue, job_id = %job_id, error = %e, "Job failed");
                    listener.on_failed(&job_id, &e).await;
                }
                Err(join_error) => {
                    let e = GitgateError::job_error(job_id.as_str(), join_error.to_string());
                    error!(queue = %queue, job_id = %job_id, error = %e, "Job aborted");
                    listener.on_failed(&job_id, &e).await;
                }
            }
        });
        Ok(())
    }
}
