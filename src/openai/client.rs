use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::OpenAiError;
use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::jobs::Generator;

pub const API_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiClient {
    api_key: String,
    client: Client,
    base_url: String,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Result<Self, OpenAiError> {
        Self::with_base_url(api_key, API_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create a client pointing at a custom base URL (proxies, compatible
    /// servers, tests).
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens: None,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn chat_completion(
        &self,
        req: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %req.model, "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(OpenAiError::from_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(1000);
            return Err(OpenAiError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(OpenAiError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let body = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(OpenAiError::from_transport)?;
        Ok(body)
    }
}

impl Generator for OpenAiClient {
    type Error = OpenAiError;

    async fn generate(&self, content: &str, model: &str) -> Result<String, OpenAiError> {
        let req = ChatCompletionRequest::user(model, content, self.max_tokens);
        let response = self.chat_completion(&req).await?;
        response
            .first_text()
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(OpenAiError::EmptyResponse)
    }
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
