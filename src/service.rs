use std::sync::Arc;

use tracing::debug;

use crate::error::JobError;
use crate::jobs::{DEFAULT_MODEL, Generator, Job, JobRunner, JobStore};

/// Single entry point for the routing layer: submit, fetch and list jobs.
pub struct MessageService<G> {
    store: Arc<JobStore>,
    runner: JobRunner<G>,
    default_model: String,
}

impl<G: Generator> MessageService<G> {
    pub fn new(store: Arc<JobStore>, generator: G) -> Self {
        Self {
            runner: JobRunner::new(Arc::clone(&store), generator),
            store,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model used when a submission does not name one.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Validate, create and run a job, returning it in its terminal state.
    ///
    /// A blank `model` counts as absent. Provider failures come back as a
    /// `failed` job, not as an error.
    pub async fn submit(&self, content: &str, model: Option<&str>) -> Result<Job, JobError> {
        if content.trim().is_empty() {
            return Err(JobError::Validation("content must not be empty".into()));
        }

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());

        let job = self.store.create(content.to_string(), model.to_string())?;
        debug!(job_id = %job.id, "submitted job");
        self.runner.run(&job).await
    }

    pub fn fetch(&self, id: &str) -> Result<Job, JobError> {
        self.store.get(id)
    }

    pub fn list_all(&self) -> Vec<Job> {
        self.store.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{IdScheme, JobStatus};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Pops scripted results in order; echoes the prompt once the script runs out.
    struct ScriptedGenerator {
        script: Mutex<Vec<Result<String, String>>>,
        seen_models: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(mut script: Vec<Result<String, String>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                seen_models: Mutex::new(Vec::new()),
            }
        }

        fn echo() -> Self {
            Self::new(Vec::new())
        }
    }

    impl Generator for ScriptedGenerator {
        type Error = String;

        async fn generate(&self, content: &str, model: &str) -> Result<String, String> {
            self.seen_models.lock().unwrap().push(model.to_string());
            let next = self.script.lock().unwrap().pop();
            next.unwrap_or_else(|| Ok(format!("echo: {content}")))
        }
    }

    fn service(generator: ScriptedGenerator) -> MessageService<ScriptedGenerator> {
        MessageService::new(Arc::new(JobStore::in_memory(IdScheme::Uuid)), generator)
    }

    #[tokio::test]
    async fn submit_completes_with_provider_text() {
        let svc = service(ScriptedGenerator::new(vec![Ok("Hi there".into())]));

        let job = svc.submit("Hello", Some("gpt-3.5-turbo")).await.unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.response.as_deref(), Some("Hi there"));
        assert!(job.error.is_none());
        assert_eq!(job.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn submit_defaults_model() {
        let svc = service(ScriptedGenerator::echo());

        let job = svc.submit("Hello", None).await.unwrap();
        assert_eq!(job.model, "gpt-3.5-turbo");

        let blank = svc.submit("Hello", Some("  ")).await.unwrap();
        assert_eq!(blank.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn configured_default_model_reaches_provider() {
        let svc = service(ScriptedGenerator::echo()).with_default_model("gpt-4o-mini");

        let job = svc.submit("Hello", None).await.unwrap();
        assert_eq!(job.model, "gpt-4o-mini");

        let explicit = svc.submit("Hello", Some("gpt-4")).await.unwrap();
        assert_eq!(explicit.model, "gpt-4");

        let seen = svc.runner.generator().seen_models.lock().unwrap().clone();
        assert_eq!(seen, vec!["gpt-4o-mini", "gpt-4"]);
    }

    #[tokio::test]
    async fn provider_failure_is_a_failed_job_not_an_error() {
        let svc = service(ScriptedGenerator::new(vec![Err("rate limit exceeded".into())]));

        let job = svc.submit("Hello", None).await.unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("rate limit exceeded"));
        assert!(job.response.is_none());
    }

    #[tokio::test]
    async fn empty_content_is_rejected_and_nothing_is_stored() {
        let svc = service(ScriptedGenerator::echo());
        svc.submit("first", None).await.unwrap();
        let before = svc.list_all().len();

        for content in ["", "   ", "\n\t"] {
            let err = svc.submit(content, None).await.unwrap_err();
            assert!(matches!(err, JobError::Validation(_)));
        }

        assert_eq!(svc.list_all().len(), before);
        assert_eq!(svc.runner.generator().seen_models.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_returns_submitted_record() {
        let svc = service(ScriptedGenerator::echo());
        let submitted = svc.submit("Hello", Some("gpt-4")).await.unwrap();

        let fetched = svc.fetch(&submitted.id).unwrap();
        assert_eq!(fetched, submitted);
    }

    #[tokio::test]
    async fn fetch_unknown_is_not_found() {
        let svc = service(ScriptedGenerator::echo());
        let err = svc.fetch("nonexistent-id").unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_all_in_submission_order_with_consistent_terminal_fields() {
        let svc = service(ScriptedGenerator::new(vec![
            Ok("a".into()),
            Err("quota exceeded".into()),
            Ok("c".into()),
        ]));

        for content in ["A", "B", "C"] {
            svc.submit(content, None).await.unwrap();
        }

        let jobs = svc.list_all();
        let contents: Vec<&str> = jobs.iter().map(|j| j.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B", "C"]);

        for job in &jobs {
            assert!(job.is_terminal());
            assert!(job.response.is_some() != job.error.is_some());
            assert!(job.validate().is_ok());
        }
        assert_eq!(jobs[1].status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn submitted_ids_are_unique() {
        let svc = service(ScriptedGenerator::echo());
        let mut ids = HashSet::new();
        for i in 0..50 {
            let job = svc.submit(&format!("msg {i}"), None).await.unwrap();
            assert!(ids.insert(job.id));
        }
    }
}
