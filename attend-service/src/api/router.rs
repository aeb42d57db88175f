use super::handlers::checkins::handle_checkins;
use super::handlers::events::{handle_bulk_mint, handle_event_jobs, handle_event_status};
use super::handlers::health::{handle_health, handle_metrics, handle_ready};
use super::handlers::jobs::{handle_job_detail, handle_job_retry};
use super::handlers::queue::handle_queue_stats;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::state::ApiState;
use crate::service::shutdown::wait_for_shutdown;
use attend_core::foundation::PipelineError;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub async fn run_api_server(addr: SocketAddr, state: Arc<ApiState>, mut shutdown: watch::Receiver<bool>) -> Result<(), PipelineError> {
    info!("binding api server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await.map_err(|err| PipelineError::NetworkError(format!("bind {}: {}", addr, err)))?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { wait_for_shutdown(&mut shutdown).await })
        .await
        .map_err(|err| {
            error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
            PipelineError::NetworkError(err.to_string())
        })?;
    info!("HTTP server stopped addr={}", addr);
    Ok(())
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .route("/v1/checkins", post(handle_checkins))
        .route("/v1/events/:event_id/status", get(handle_event_status))
        .route("/v1/events/:event_id/jobs", get(handle_event_jobs))
        .route("/v1/events/:event_id/bulk-mint", post(handle_bulk_mint))
        .route("/v1/jobs/:job_id", get(handle_job_detail))
        .route("/v1/jobs/:job_id/retry", post(handle_job_retry))
        .route("/v1/queue", get(handle_queue_stats))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}
