mod job;
mod lifecycle;
mod state;
mod store;

pub use job::{DEFAULT_MODEL, Job, JobOutcome};
pub use lifecycle::{Generator, JobRunner};
pub use state::{JobStatus, StateMachine};
pub use store::{IdScheme, JobStore};
