//! Tipos de erro para o cliente da API OpenAI.
//!
//! Define [`OpenAiError`] com variantes para rate limiting, erros da API,
//! timeouts e erros de rede. A mensagem de `Display` de cada variante é o
//! texto gravado no campo `error` de um job que falhou.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API da OpenAI.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// O servidor retornou HTTP 429 (rate limit ou cota excedida).
    /// O campo `retry_after_ms` indica quantos milissegundos esperar antes de retentar.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 404 modelo inexistente).
    /// Contém o código de status HTTP e a mensagem de erro do corpo da resposta.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A requisição excedeu o timeout configurado no cliente.
    #[error("request timed out")]
    Timeout,

    /// A resposta não trouxe nenhum texto gerado.
    #[error("provider returned no content")]
    EmptyResponse,

    /// Falha de rede subjacente (DNS, conexão recusada, corpo inválido).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl OpenAiError {
    /// Classifica o erro entre falhas transitórias (vale retentar) e definitivas.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAiError::RateLimited { .. } | OpenAiError::Timeout => true,
            OpenAiError::ApiError { status, .. } => *status >= 500,
            OpenAiError::NetworkError(err) => err.is_connect() || err.is_request(),
            OpenAiError::EmptyResponse => false,
        }
    }

    /// Converte um erro do `reqwest`, separando timeouts das demais falhas.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OpenAiError::Timeout
        } else {
            OpenAiError::NetworkError(err)
        }
    }
}
