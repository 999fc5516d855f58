use thiserror::Error;

use crate::jobs::JobStatus;

/// Errors raised by the job core (store, lifecycle manager, message service).
///
/// A failed provider call is not one of these: it is recorded on the job
/// itself as a `failed` outcome.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {id} is already {status}; it cannot be settled again")]
    InvalidTransition { id: String, status: JobStatus },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl JobError {
    pub(crate) fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        JobError::Storage(format!("{context}: {err}"))
    }
}
