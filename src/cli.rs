//! Interface de linha de comando do aimessage baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, send, jobs)
//! e flags globais (--config, --store, --id-scheme, --verbose, --json-logs).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;
use crate::jobs::IdScheme;

/// aimessage — envia mensagens a um LLM e registra cada troca como um job.
#[derive(Debug, Parser)]
#[command(name = "aimessage", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./aimessage.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Arquivo JSON onde os jobs são persistidos.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Esquema de geração de IDs de job.
    #[arg(long, global = true)]
    pub id_scheme: Option<IdSchemeArg>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emite logs em JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

/// Esquema de IDs aceito pela CLI, mapeado para [`IdScheme`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IdSchemeArg {
    /// UUID v4 aleatório.
    Uuid,
    /// Inteiros sequenciais a partir de 1.
    Sequential,
}

impl From<IdSchemeArg> for IdScheme {
    fn from(arg: IdSchemeArg) -> Self {
        match arg {
            IdSchemeArg::Uuid => IdScheme::Uuid,
            IdSchemeArg::Sequential => IdScheme::Sequential,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sobe a API HTTP.
    Serve {
        /// Endereço de escuta.
        #[arg(long)]
        host: Option<String>,

        /// Porta de escuta.
        #[arg(long)]
        port: Option<u16>,

        /// Modelo usado quando a requisição não informa um.
        #[arg(long)]
        default_model: Option<String>,
    },

    /// Envia uma única mensagem e mostra o job resultante.
    Send {
        /// Texto da mensagem.
        content: String,

        /// Modelo a usar (padrão: o da configuração).
        #[arg(long)]
        model: Option<String>,
    },

    /// Lista os jobs persistidos, ou mostra um job pelo ID.
    Jobs {
        /// ID do job a mostrar.
        id: Option<String>,
    },
}

impl Cli {
    /// Aplica as flags da linha de comando sobre a configuração carregada.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(scheme) = self.id_scheme {
            config.id_scheme = scheme.into();
        }
        if let Command::Serve {
            host,
            port,
            default_model,
        } = &self.command
        {
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(model) = default_model {
                config.default_model = model.clone();
            }
        }
    }
}
