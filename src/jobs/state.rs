use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::{Job, JobOutcome};
use crate::error::JobError;

/// The three states a job can be in.
///
/// Each job flows through: PENDING → COMPLETED or PENDING → FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    /// `completed` and `failed` admit no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Completed) | (JobStatus::Pending, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Applies terminal outcomes to a `Job`.
pub struct StateMachine;

impl StateMachine {
    /// Settle a pending job with the given outcome.
    ///
    /// - `Completed(text)` sets `response`, `Failed(reason)` sets `error`;
    ///   the other field is cleared.
    /// - `completed_at` is set once and never precedes `created_at`.
    /// - A job that is already terminal is left untouched and
    ///   `JobError::InvalidTransition` is returned.
    pub fn settle(job: &mut Job, outcome: JobOutcome, at: DateTime<Utc>) -> Result<(), JobError> {
        let next = outcome.status();
        if !job.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                id: job.id.clone(),
                status: job.status,
            });
        }

        match outcome {
            JobOutcome::Completed(text) => {
                job.response = Some(text);
                job.error = None;
            }
            JobOutcome::Failed(reason) => {
                job.error = Some(reason);
                job.response = None;
            }
        }
        job.status = next;
        job.completed_at = Some(at.max(job.created_at));

        Ok(())
    }
}
