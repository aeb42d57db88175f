use super::super::middleware::auth::authorize_operator;
use super::super::state::ApiState;
use super::types::ApiError;
use attend_core::application::BulkMintReport;
use attend_core::domain::EventMintSummary;
use attend_core::foundation::EventId;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

pub async fn handle_event_status(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<String>,
) -> Result<Json<EventMintSummary>, ApiError> {
    Ok(Json(state.queries.event_summary(&EventId::new(event_id))?))
}

pub async fn handle_event_jobs(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let jobs = state.queries.event_jobs(&EventId::new(event_id.clone()))?;
    Ok(Json(serde_json::json!({ "event_id": event_id, "count": jobs.len(), "jobs": jobs })))
}

/// Operator action: re-queues every valid-wallet check-in stored for the event.
pub async fn handle_bulk_mint(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<BulkMintReport>, ApiError> {
    authorize_operator(&headers, state.operator_token.as_deref()).map_err(ApiError::unauthorized)?;
    Ok(Json(state.ingestor.bulk_mint(&EventId::new(event_id))?))
}
