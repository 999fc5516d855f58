//! Interface de terminal do aimessage — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`JobProgress`] acompanha visualmente
//! a chamada ao modelo feita pelo subcomando `send`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::jobs::{Job, JobStatus};

/// Indicador visual de progresso para a execução de um job no terminal.
pub struct JobProgress {
    pb: ProgressBar,
}

impl JobProgress {
    /// Inicia o spinner com o modelo e um trecho da mensagem.
    pub fn start(model: &str, content: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{model}: {}", preview(content, 60)));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    /// Finaliza o spinner e exibe o resultado final do job.
    ///
    /// Sucesso é mostrado em verde com checkmark; falha em vermelho com X.
    pub fn complete(&self, job: &Job) {
        self.pb.finish_and_clear();
        match job.status {
            JobStatus::Completed => println!(
                "  {} Job {} completed",
                Style::new().green().bold().apply_to("✓"),
                job.id
            ),
            JobStatus::Failed => println!(
                "  {} Job {} failed: {}",
                Style::new().red().bold().apply_to("✗"),
                job.id,
                job.error.as_deref().unwrap_or("unknown error")
            ),
            JobStatus::Pending => println!("  Job {} is still pending", job.id),
        }
    }

    /// Encerra o spinner sem resultado (erro antes de o job ser criado).
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Completed => Style::new().green().bold(),
        JobStatus::Failed => Style::new().red().bold(),
        JobStatus::Pending => Style::new().yellow(),
    }
}

/// Imprime o job formatado em JSON, precedido do status colorido.
pub fn print_job(job: &Job) {
    println!(
        "\n  Job {} [{}]",
        job.id,
        status_style(job.status).apply_to(job.status)
    );
    match serde_json::to_string_pretty(job) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("  failed to render job: {err}"),
    }
}

/// Imprime uma linha por job, do mais antigo ao mais novo.
pub fn print_jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("  No jobs recorded.");
        return;
    }
    let dim = Style::new().dim();
    for job in jobs {
        println!(
            "  {:<38} {:<10} {:<16} {}",
            job.id,
            status_style(job.status).apply_to(job.status),
            job.model,
            dim.apply_to(preview(&job.content, 50))
        );
    }
}

/// Primeira linha do texto, truncada em `max` caracteres.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
