use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::JobStatus;

/// Model used when a submission does not name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// How the single provider call for a job resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The provider returned generated text.
    Completed(String),
    /// The provider call failed (timeout, unknown model, quota...).
    Failed(String),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Completed(_) => JobStatus::Completed,
            JobOutcome::Failed(_) => JobStatus::Failed,
        }
    }
}

/// One submitted message and its eventual model response or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub content: String,
    pub model: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: String, content: String, model: String) -> Self {
        Self {
            id,
            content,
            model,
            status: JobStatus::Pending,
            response: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check the record-level invariants. Used when loading jobs that were
    /// not produced by this process.
    pub fn validate(&self) -> Result<(), String> {
        let shape_ok = match self.status {
            JobStatus::Pending => {
                self.response.is_none() && self.error.is_none() && self.completed_at.is_none()
            }
            JobStatus::Completed => {
                self.response.is_some() && self.error.is_none() && self.completed_at.is_some()
            }
            JobStatus::Failed => {
                self.error.is_some() && self.response.is_none() && self.completed_at.is_some()
            }
        };
        if !shape_ok {
            return Err(format!(
                "job {} has fields inconsistent with status {}",
                self.id, self.status
            ));
        }

        if let Some(completed_at) = self.completed_at
            && completed_at < self.created_at
        {
            return Err(format!("job {} completed before it was created", self.id));
        }

        Ok(())
    }
}
