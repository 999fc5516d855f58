use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use aimessage::cli::{Cli, Command};
use aimessage::config::AppConfig;
use aimessage::jobs::JobStore;
use aimessage::openai::{OpenAiClient, Retrying};
use aimessage::service::MessageService;
use aimessage::{logging, server, ui};

type Service = MessageService<Retrying<OpenAiClient>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Command::Serve { .. } => {
            warn_if_missing_key(&config);
            let service = build_service(&config)?;
            server::serve(&config.bind_address(), Arc::new(service)).await?;
        }
        Command::Send { content, model } => {
            warn_if_missing_key(&config);
            let service = build_service(&config)?;
            let shown_model = model.as_deref().unwrap_or(service.default_model());
            let progress = ui::JobProgress::start(shown_model, &content);
            match service.submit(&content, model.as_deref()).await {
                Ok(job) => {
                    progress.complete(&job);
                    ui::print_job(&job);
                }
                Err(err) => {
                    progress.abandon();
                    return Err(err.into());
                }
            }
        }
        Command::Jobs { id } => {
            if config.store_path.is_none() {
                warn!("no store path configured; jobs are only kept in memory");
            }
            let service = build_service(&config)?;
            match id {
                Some(id) => ui::print_job(&service.fetch(&id)?),
                None => ui::print_jobs(&service.list_all()),
            }
        }
    }

    Ok(())
}

fn build_service(config: &AppConfig) -> Result<Service> {
    let store = match &config.store_path {
        Some(path) => JobStore::open(path, config.id_scheme)?,
        None => JobStore::in_memory(config.id_scheme),
    };

    let client = OpenAiClient::with_base_url(
        config.api_key.clone(),
        config.base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?
    .with_max_tokens(config.max_tokens);

    let generator = Retrying::new(client, config.retry_policy());
    Ok(MessageService::new(Arc::new(store), generator)
        .with_default_model(config.default_model.clone()))
}

fn warn_if_missing_key(config: &AppConfig) {
    if config.api_key.is_empty() {
        warn!("OPENAI_API_KEY not set; provider calls will fail");
    }
}
