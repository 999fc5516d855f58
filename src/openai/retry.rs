use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use super::error::OpenAiError;
use crate::jobs::Generator;

/// Configuration for retrying transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts after the first call. Zero disables retrying.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Calculate the delay for a given retry attempt using exponential backoff.
    /// delay = base_delay_ms * 2^(attempt - 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Wraps a generator and retries transient failures.
///
/// The job core still sees a single `generate` call per job; only the final
/// result reaches it.
pub struct Retrying<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G> Retrying<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G> Generator for Retrying<G>
where
    G: Generator<Error = OpenAiError>,
{
    type Error = OpenAiError;

    async fn generate(&self, content: &str, model: &str) -> Result<String, OpenAiError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(content, model).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let mut delay_ms = self.policy.delay_for_attempt(attempt);
                    if let OpenAiError::RateLimited { retry_after_ms } = err {
                        delay_ms = delay_ms.max(retry_after_ms);
                    }
                    warn!(
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms,
                        error = %err,
                        "retrying provider call"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the scripted errors first, then succeeds.
    struct FlakyGenerator {
        failures: Mutex<Vec<OpenAiError>>,
        calls: AtomicU32,
    }

    impl FlakyGenerator {
        fn new(failures: Vec<OpenAiError>) -> Self {
            Self {
                failures: Mutex::new(failures),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Generator for FlakyGenerator {
        type Error = OpenAiError;

        async fn generate(&self, _content: &str, _model: &str) -> Result<String, OpenAiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.failures.lock().unwrap().pop();
            match next {
                Some(err) => Err(err),
                None => Ok("finally".into()),
            }
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 1,
        }
    }

    #[test]
    fn exponential_backoff() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay_ms: 1000,
        };
        assert_eq!(policy.delay_for_attempt(1), 1000);
        assert_eq!(policy.delay_for_attempt(2), 2000);
        assert_eq!(policy.delay_for_attempt(3), 4000);
        assert_eq!(policy.delay_for_attempt(4), 8000);
        assert_eq!(policy.delay_for_attempt(200), u64::MAX);
    }

    #[tokio::test]
    async fn zero_retries_is_pass_through() {
        let retrying = Retrying::new(FlakyGenerator::new(vec![OpenAiError::Timeout]), policy(0));

        let err = retrying.generate("Hello", "m").await.unwrap_err();
        assert!(matches!(err, OpenAiError::Timeout));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let retrying = Retrying::new(
            FlakyGenerator::new(vec![
                OpenAiError::Timeout,
                OpenAiError::ApiError {
                    status: 502,
                    message: "bad gateway".into(),
                },
            ]),
            policy(3),
        );

        let text = retrying.generate("Hello", "m").await.unwrap();
        assert_eq!(text, "finally");
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let retrying = Retrying::new(
            FlakyGenerator::new(vec![OpenAiError::ApiError {
                status: 404,
                message: "model not found".into(),
            }]),
            policy(3),
        );

        let err = retrying.generate("Hello", "m").await.unwrap_err();
        assert!(matches!(err, OpenAiError::ApiError { status: 404, .. }));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let retrying = Retrying::new(
            FlakyGenerator::new(vec![
                OpenAiError::Timeout,
                OpenAiError::Timeout,
                OpenAiError::Timeout,
            ]),
            policy(2),
        );

        let err = retrying.generate("Hello", "m").await.unwrap_err();
        assert!(matches!(err, OpenAiError::Timeout));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 3);
    }
}
