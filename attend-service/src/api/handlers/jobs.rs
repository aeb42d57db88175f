use super::super::middleware::auth::authorize_operator;
use super::super::state::ApiState;
use super::types::{parse_job_id, ApiError};
use attend_core::PipelineError;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

pub async fn handle_job_detail(State(state): State<Arc<ApiState>>, Path(job_id): Path<String>) -> Result<Response, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let detail = state.queries.job_detail(&job_id)?.ok_or_else(|| PipelineError::job_not_found(format!("{:#x}", job_id)))?;
    Ok(Json(detail).into_response())
}

/// Operator retry of a permanently failed job. 409 when the job is executing or not retryable.
pub async fn handle_job_retry(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    authorize_operator(&headers, state.operator_token.as_deref()).map_err(ApiError::unauthorized)?;
    let job_id = parse_job_id(&job_id)?;
    let job = state.coordinator.operator_retry(&job_id)?;
    state.queue.push(job.job_id);
    Ok((StatusCode::ACCEPTED, Json(job)).into_response())
}
