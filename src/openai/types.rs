//! Tipos de dados para requisições e respostas do endpoint Chat Completions da OpenAI.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato esperado por `POST /v1/chat/completions`.

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o endpoint `/chat/completions`.
///
/// Contém o modelo desejado, a lista de mensagens e, opcionalmente,
/// o limite de tokens da resposta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Identificador do modelo (ex.: "gpt-3.5-turbo").
    pub model: String,
    /// Lista de mensagens compondo a conversa.
    pub messages: Vec<ChatMessage>,
    /// Limite de tokens na resposta. Omitido do JSON quando `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Requisição com uma única mensagem de usuário.
    pub fn user(model: &str, content: &str, max_tokens: Option<u32>) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Some(content.to_string()),
            }],
            max_tokens,
        }
    }
}

/// Uma mensagem da conversa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Papel do remetente: "system", "user" ou "assistant".
    pub role: String,
    /// Conteúdo textual. A API pode devolver `null` (ex.: chamadas de ferramenta).
    #[serde(default)]
    pub content: Option<String>,
}

/// Resposta retornada pelo endpoint `/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Identificador único da resposta (gerado pela API).
    pub id: String,
    /// Modelo que gerou a resposta.
    pub model: String,
    /// Alternativas geradas; normalmente apenas uma.
    pub choices: Vec<Choice>,
    /// Estatísticas de uso de tokens, quando informadas.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Texto da primeira alternativa, se houver.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// Uma alternativa gerada pelo modelo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    /// Motivo da parada (ex.: "stop", "length").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Estatísticas de consumo de tokens para uma chamada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
