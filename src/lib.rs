//! aimessage: forwards text messages to an LLM provider and records each
//! exchange as a retrievable job.
//!
//! The job core lives in [`jobs`] (record, state machine, store, lifecycle
//! runner) and [`service`] (the entry point used by the HTTP layer in
//! [`server`]). [`openai`] provides the model-calling collaborator.

pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod openai;
pub mod server;
pub mod service;
pub mod ui;

pub use error::JobError;
pub use jobs::{Generator, Job, JobStatus, JobStore};
pub use service::MessageService;
