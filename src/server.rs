//! HTTP routing layer: maps requests onto the [`MessageService`].
//!
//! - `GET /` welcome document
//! - `POST /messages` submit a message, returns the settled job
//! - `GET /jobs` all jobs, oldest first
//! - `GET /jobs/{job_id}` one job

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::JobError;
use crate::jobs::{Generator, Job};
use crate::service::MessageService;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
}

pub fn router<G>(service: Arc<MessageService<G>>) -> Router
where
    G: Generator + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/messages", post(create_message::<G>))
        .route("/jobs", get(list_jobs::<G>))
        .route("/jobs/{job_id}", get(get_job::<G>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve<G>(addr: &str, service: Arc<MessageService<G>>) -> anyhow::Result<()>
where
    G: Generator + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the AI Message API",
        "endpoints": {
            "create_message": "POST /messages",
            "get_all_jobs": "GET /jobs",
            "get_job_by_id": "GET /jobs/{job_id}",
        },
    }))
}

async fn create_message<G>(
    State(service): State<Arc<MessageService<G>>>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<Json<Job>, JobError>
where
    G: Generator + 'static,
{
    let job = service
        .submit(&body.content, body.model.as_deref())
        .await?;
    Ok(Json(job))
}

async fn list_jobs<G>(State(service): State<Arc<MessageService<G>>>) -> Json<Vec<Job>>
where
    G: Generator + 'static,
{
    Json(service.list_all())
}

async fn get_job<G>(
    State(service): State<Arc<MessageService<G>>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, JobError>
where
    G: Generator + 'static,
{
    service.fetch(&job_id).map(Json)
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            JobError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            JobError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            JobError::InvalidTransition { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid_transition")
            }
            JobError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        json_error(status, code, self.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
