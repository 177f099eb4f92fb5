use super::job_routes::make_job_routes;
use super::state::ServerState;
use super::{log_requests, metrics, ServerConfig};
use crate::errors::ErrorCatalog;
use crate::jobs::JobService;

use anyhow::{Context, Result};
use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn make_app(
    config: ServerConfig,
    job_service: Arc<JobService>,
    error_catalog: Arc<ErrorCatalog>,
    shutdown: CancellationToken,
) -> Router {
    let state = ServerState::new(config, job_service, error_catalog, shutdown);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .merge(make_job_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

/// Serve the API and the metrics endpoint until `shutdown` is cancelled.
pub async fn run_server(
    config: ServerConfig,
    job_service: Arc<JobService>,
    error_catalog: Arc<ErrorCatalog>,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, job_service, error_catalog, shutdown.clone());

    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Listening on port {}", port);
    info!("Metrics available at port {}", metrics_port);

    let metrics_shutdown = shutdown.clone();
    let metrics_server = axum::serve(metrics_listener, make_metrics_app())
        .with_graceful_shutdown(async move { metrics_shutdown.cancelled().await });
    let api_server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await });

    tokio::try_join!(
        async { api_server.await.context("API server failed") },
        async { metrics_server.await.context("Metrics server failed") },
    )?;
    info!("Server stopped");
    Ok(())
}
