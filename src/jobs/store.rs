//! Keyed storage for job records.
//!
//! [`JobStore`] keeps jobs in insertion order behind a single mutex, so
//! `create` and `update` are atomic per record. Persistence is optional: when
//! opened with a path, the whole ordered list is rewritten to a JSON file
//! (temp file + rename) after every mutation, and a failed write rolls the
//! in-memory change back.
//!
//! The write is synchronous and happens while the lock is held, so a
//! persisted store blocks the calling thread (a tokio worker, under the HTTP
//! server) for the duration of one small file write per mutation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::job::{Job, JobOutcome};
use super::state::StateMachine;
use crate::error::JobError;

/// How new job identifiers are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// Random UUID v4 strings.
    #[default]
    Uuid,
    /// Decimal integers, starting at "1" and never reused.
    Sequential,
}

pub struct JobStore {
    id_scheme: IdScheme,
    path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    jobs: Vec<Job>,
    // id -> position in `jobs`
    index: HashMap<String, usize>,
    last_seq: u64,
}

impl StoreState {
    fn from_jobs(jobs: Vec<Job>) -> Result<Self, String> {
        let mut state = StoreState::default();
        for job in jobs {
            job.validate()?;
            if state.index.contains_key(&job.id) {
                return Err(format!("duplicate job id {}", job.id));
            }
            if let Ok(seq) = job.id.parse::<u64>() {
                state.last_seq = state.last_seq.max(seq);
            }
            state.index.insert(job.id.clone(), state.jobs.len());
            state.jobs.push(job);
        }
        Ok(state)
    }

    fn next_id(&mut self, scheme: IdScheme) -> String {
        loop {
            let candidate = match scheme {
                IdScheme::Uuid => Uuid::new_v4().to_string(),
                IdScheme::Sequential => match self.last_seq.checked_add(1) {
                    Some(seq) => {
                        self.last_seq = seq;
                        seq.to_string()
                    }
                    // Counter exhausted: fall back to the lowest unused number.
                    None => return self.lowest_free_seq(),
                },
            };
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn lowest_free_seq(&self) -> String {
        (1..=u64::MAX)
            .map(|seq| seq.to_string())
            .find(|id| !self.index.contains_key(id))
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

impl JobStore {
    /// A store that lives only as long as the process.
    pub fn in_memory(id_scheme: IdScheme) -> Self {
        Self {
            id_scheme,
            path: None,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Open a store backed by a JSON file, loading any jobs already in it.
    ///
    /// A missing file is an empty store. A file that cannot be read, parsed,
    /// or that holds records breaking the job invariants is a
    /// `JobError::Storage`; it is never silently discarded.
    pub fn open(path: impl Into<PathBuf>, id_scheme: IdScheme) -> Result<Self, JobError> {
        let path = path.into();

        let state = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| JobError::storage(&format!("reading {}", path.display()), e))?;
            let jobs: Vec<Job> = if contents.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&contents)
                    .map_err(|e| JobError::storage(&format!("parsing {}", path.display()), e))?
            };
            StoreState::from_jobs(jobs)
                .map_err(|e| JobError::storage(&format!("loading {}", path.display()), e))?
        } else {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|e| {
                    JobError::storage(&format!("creating {}", parent.display()), e)
                })?;
            }
            StoreState::default()
        };

        debug!(path = %path.display(), jobs = state.jobs.len(), "opened job store");

        Ok(Self {
            id_scheme,
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    pub fn id_scheme(&self) -> IdScheme {
        self.id_scheme
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create a new `pending` job with a fresh identifier.
    pub fn create(&self, content: String, model: String) -> Result<Job, JobError> {
        let mut state = self.lock();
        let id = state.next_id(self.id_scheme);
        let job = Job::new(id.clone(), content, model);

        let position = state.jobs.len();
        state.index.insert(id.clone(), position);
        state.jobs.push(job.clone());

        if let Err(err) = self.persist(&state) {
            state.jobs.pop();
            state.index.remove(&id);
            return Err(err);
        }

        debug!(job_id = %id, "created job");
        Ok(job)
    }

    pub fn get(&self, id: &str) -> Result<Job, JobError> {
        let state = self.lock();
        state
            .index
            .get(id)
            .map(|&position| state.jobs[position].clone())
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Snapshot of every job, oldest first.
    pub fn list(&self) -> Vec<Job> {
        self.lock().jobs.clone()
    }

    /// Apply the single terminal transition for a job.
    ///
    /// The status check and the write happen under one lock, so of two
    /// concurrent updates to the same id exactly one succeeds; the other
    /// gets `JobError::InvalidTransition`.
    pub fn update(
        &self,
        id: &str,
        outcome: JobOutcome,
        completed_at: DateTime<Utc>,
    ) -> Result<Job, JobError> {
        let mut state = self.lock();
        let position = *state
            .index
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        let previous = state.jobs[position].clone();
        StateMachine::settle(&mut state.jobs[position], outcome, completed_at)?;

        if let Err(err) = self.persist(&state) {
            state.jobs[position] = previous;
            return Err(err);
        }

        Ok(state.jobs[position].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic while holding the lock never leaves a half-applied record:
        // every mutation is rolled back or completed before returning.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &StoreState) -> Result<(), JobError> {
        match &self.path {
            Some(path) => write_snapshot(path, &state.jobs),
            None => Ok(()),
        }
    }
}

fn write_snapshot(path: &Path, jobs: &[Job]) -> Result<(), JobError> {
    let bytes =
        serde_json::to_vec_pretty(jobs).map_err(|e| JobError::storage("serializing jobs", e))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)
        .map_err(|e| JobError::storage(&format!("writing {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| JobError::storage(&format!("replacing {}", path.display()), e))?;
    Ok(())
}
