use super::super::middleware::auth::authorize_operator;
use super::super::state::ApiState;
use super::types::ApiError;
use attend_core::foundation::now_nanos;
use attend_core::infrastructure::ledger::BreakerState;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::Arc;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
    }))
}

/// Ready when storage answers and no ledger operation has its breaker open.
pub async fn handle_ready(State(state): State<Arc<ApiState>>) -> Response {
    let storage_ok = state.queries.health_check().is_ok();
    let breakers: BTreeMap<&'static str, BreakerState> = state.ledger.breaker_states().into_iter().collect();
    let ledger_ok = breakers.values().all(|s| *s != BreakerState::Open);
    let ready = storage_ok && ledger_ok;
    if ready {
        trace!("ready check: ok");
    } else {
        debug!("ready check: degraded storage_ok={} ledger_ok={} breakers={:?}", storage_ok, ledger_ok, breakers);
    }
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = Json(serde_json::json!({
        "status": if ready { "ready" } else { "degraded" },
        "storage_ok": storage_ok,
        "ledger_ok": ledger_ok,
        "breakers": breakers,
    }));
    (status, body).into_response()
}

pub async fn handle_metrics(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    if let Err(err) = authorize_operator(&headers, state.operator_token.as_deref()) {
        return ApiError::unauthorized(err).into_response();
    }

    match state.queries.queue_stats(now_nanos()) {
        Ok(stats) => state.metrics.set_job_counts(&stats),
        Err(err) => debug!("job gauge refresh failed error={}", err),
    }

    match state.metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));
            response
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
