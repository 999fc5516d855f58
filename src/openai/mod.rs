pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::OpenAiClient;
pub use error::OpenAiError;
pub use retry::{RetryPolicy, Retrying};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage};
