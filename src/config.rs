//! Configuração do aimessage carregada a partir de `aimessage.toml`.
//!
//! A struct [`AppConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `OPENAI_API_KEY` (também lida de um `.env`)
//! tem precedência sobre o arquivo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::jobs::{DEFAULT_MODEL, IdScheme};
use crate::openai::RetryPolicy;
use crate::openai::client::API_BASE_URL;

/// Nome do arquivo procurado no diretório atual quando `--config` não é informado.
pub const CONFIG_FILE: &str = "aimessage.toml";

/// Configuração de nível superior carregada de `aimessage.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chave da API OpenAI.
    pub api_key: String,

    /// URL base da API (permite proxies e servidores compatíveis).
    pub base_url: String,

    /// Modelo usado quando a requisição não informa um.
    pub default_model: String,

    /// Limite de tokens por resposta; `None` deixa a decisão para a API.
    pub max_tokens: Option<u32>,

    /// Timeout total de cada chamada ao provedor, em segundos.
    pub request_timeout_secs: u64,

    /// Endereço de escuta do servidor HTTP.
    pub host: String,

    /// Porta do servidor HTTP.
    pub port: u16,

    /// Esquema de geração de IDs de job.
    pub id_scheme: IdScheme,

    /// Arquivo JSON para persistir os jobs; ausente mantém tudo em memória.
    pub store_path: Option<PathBuf>,

    /// Máximo de retentativas em falhas transitórias do provedor.
    pub max_retries: u32,

    /// Atraso base em milissegundos para backoff exponencial.
    pub base_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            api_key: String::new(),
            base_url: API_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            request_timeout_secs: 120,
            host: "0.0.0.0".to_string(),
            port: 8000,
            id_scheme: IdScheme::default(),
            store_path: None,
            max_retries: retry.max_retries,
            base_delay_ms: retry.base_delay_ms,
        }
    }
}

impl AppConfig {
    /// Carrega a configuração.
    ///
    /// Com `path`, o arquivo precisa existir. Sem `path`, usa `aimessage.toml`
    /// do diretório atual se existir, ou os valores padrão.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // `.env` é opcional.
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para a chave API.
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
        }
    }

    /// Endereço `host:port` para o servidor HTTP.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.id_scheme, IdScheme::Uuid);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.base_delay_ms, 1000);
        assert!(config.store_path.is_none());
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "sk-test-123"
            id_scheme = "sequential"
            store_path = "data/jobs.json"
            max_retries = 2
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "sk-test-123");
        assert_eq!(config.id_scheme, IdScheme::Sequential);
        assert_eq!(config.store_path, Some(PathBuf::from("data/jobs.json")));
        assert_eq!(config.retry_policy().max_retries, 2);
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "default_model = \"gpt-4o-mini\"\nport = 9001\n").unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(AppConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // No ambiente de teste, tipicamente não há aimessage.toml no diretório de trabalho.
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.default_model, "gpt-3.5-turbo");
    }
}
