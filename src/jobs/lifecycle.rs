use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::job::{Job, JobOutcome};
use super::store::JobStore;
use crate::error::JobError;

/// The model-calling collaborator: turns a prompt into generated text.
///
/// Any error is a terminal failure for the job that triggered the call; its
/// `Display` text becomes the job's `error`.
pub trait Generator: Send + Sync {
    type Error: Display + Send;

    fn generate(
        &self,
        content: &str,
        model: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Drives a pending job to a terminal state with exactly one provider call.
pub struct JobRunner<G> {
    store: Arc<JobStore>,
    generator: G,
}

impl<G: Generator> JobRunner<G> {
    pub fn new(store: Arc<JobStore>, generator: G) -> Self {
        Self { store, generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run a job and return the settled record.
    ///
    /// A job that is already terminal is rejected before the provider is
    /// called; the store re-checks under its lock when the outcome is
    /// written, so a concurrent second run still fails with
    /// `JobError::InvalidTransition` instead of overwriting the first.
    pub async fn run(&self, job: &Job) -> Result<Job, JobError> {
        let current = self.store.get(&job.id)?;
        if current.is_terminal() {
            return Err(JobError::InvalidTransition {
                id: current.id,
                status: current.status,
            });
        }

        info!(job_id = %current.id, model = %current.model, "calling provider");

        let outcome = match self.generator.generate(&current.content, &current.model).await {
            Ok(text) => JobOutcome::Completed(text),
            Err(err) => {
                warn!(job_id = %current.id, error = %err, "provider call failed");
                JobOutcome::Failed(err.to_string())
            }
        };

        let settled = self.store.update(&current.id, outcome, Utc::now())?;
        info!(job_id = %settled.id, status = %settled.status, "job settled");
        Ok(settled)
    }
}
