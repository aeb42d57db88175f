use super::super::state::ApiState;
use super::types::ApiError;
use attend_core::application::{BatchItemOutcome, IngestOutcome};
use attend_core::domain::CheckInWire;
use attend_core::foundation::ErrorCode;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Accepts one check-in object or an array of them.
///
/// A single check-in answers 202 when it was queued and 200 for a redelivery. A batch always
/// answers 200 with one result per element, in request order.
pub async fn handle_checkins(State(state): State<Arc<ApiState>>, Json(payload): Json<Value>) -> Result<Response, ApiError> {
    match payload {
        Value::Array(items) => handle_batch(&state, items),
        single => handle_single(&state, single),
    }
}

fn decode_wire(state: &ApiState, value: Value) -> Result<CheckInWire, ApiError> {
    serde_json::from_value(value).map_err(|err| {
        state.metrics.inc_checkin_rejected();
        ApiError::bad_request(format!("malformed check-in: {}", err))
    })
}

fn handle_single(state: &ApiState, value: Value) -> Result<Response, ApiError> {
    let wire = decode_wire(state, value)?;
    match state.ingestor.ingest_wire(wire) {
        Ok(IngestOutcome::Enqueued { job_id, status, created }) => Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "result": "enqueued", "job_id": job_id, "status": status, "created": created })),
        )
            .into_response()),
        Ok(IngestOutcome::Deduplicated) => Ok(Json(serde_json::json!({ "result": "deduplicated" })).into_response()),
        Err(err) => {
            if err.code() == ErrorCode::InvalidCheckIn {
                state.metrics.inc_checkin_rejected();
            }
            Err(err.into())
        }
    }
}

fn handle_batch(state: &ApiState, items: Vec<Value>) -> Result<Response, ApiError> {
    let mut wires = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let wire = decode_wire(state, item).map_err(|err| ApiError::bad_request(format!("item {}: {}", index, err.message())))?;
        wires.push(wire);
    }
    debug!("check-in batch received size={}", wires.len());

    let results = state.ingestor.ingest_batch(wires);
    let mut queued = 0usize;
    let mut duplicates = 0usize;
    let mut errors = 0usize;
    for result in &results {
        match result {
            BatchItemOutcome::Queued { .. } => queued += 1,
            BatchItemOutcome::Duplicate { .. } => duplicates += 1,
            BatchItemOutcome::Error { .. } => {
                errors += 1;
                state.metrics.inc_checkin_rejected();
            }
        }
    }
    Ok(Json(serde_json::json!({
        "total": results.len(),
        "queued": queued,
        "duplicates": duplicates,
        "errors": errors,
        "results": results,
    }))
    .into_response())
}
