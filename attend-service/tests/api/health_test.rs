use super::{call, check_in, test_api, ALICE};
use axum::http::StatusCode;

#[tokio::test]
async fn health_and_ready_are_open() {
    let api = test_api(Some("op-token"));
    let health = call(&api.router, "GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json["status"], "healthy");

    let ready = call(&api.router, "GET", "/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.json["status"], "ready");
    assert_eq!(ready.json["breakers"]["submit_signed"], "closed");
}

#[tokio::test]
async fn metrics_require_token_and_expose_counters() {
    let api = test_api(Some("op-token"));
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;

    let denied = call(&api.router, "GET", "/metrics", None, None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    let reply = call(&api.router, "GET", "/metrics", Some("op-token"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers.get("content-type").and_then(|v| v.to_str().ok()), Some("text/plain; version=0.0.4"));
    assert!(reply.text.contains("attend_checkins_total{result=\"recorded\"} 1"));
    assert!(reply.text.contains("attend_jobs{status=\"PENDING\"} 1"));
}

#[tokio::test]
async fn queue_stats_and_request_id() {
    let api = test_api(None);
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;

    let reply = call(&api.router, "GET", "/v1/queue", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["total"], 1);
    assert_eq!(reply.json["by_status"]["PENDING"], 1);
    assert_eq!(reply.json["errors"]["healthy"], true);
    assert!(reply.headers.get("x-request-id").is_some());
}
