use super::super::state::ApiState;
use super::types::ApiError;
use attend_core::domain::QueueStats;
use attend_core::foundation::now_nanos;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

pub async fn handle_queue_stats(State(state): State<Arc<ApiState>>) -> Result<Json<QueueStats>, ApiError> {
    let stats = state.queries.queue_stats(now_nanos())?;
    state.metrics.set_job_counts(&stats);
    Ok(Json(stats))
}
