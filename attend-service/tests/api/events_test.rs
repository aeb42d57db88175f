use super::{call, check_in, test_api, ALICE, BOB};
use attend_core::application::ProcessOutcome;
use attend_core::domain::MintStatus;
use attend_core::foundation::JobId;
use axum::http::StatusCode;
use serde_json::json;

fn job_id_of(reply: &super::Reply) -> JobId {
    reply.json["job_id"].as_str().expect("job id").parse().expect("parse job id")
}

#[tokio::test]
async fn event_status_counts_minted_pending_and_skipped() {
    let api = test_api(None);
    let alice = call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c2", "E1", Some(BOB)))).await;
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c3", "E1", None))).await;

    let outcome = api.state.coordinator.process(&job_id_of(&alice)).await.expect("process");
    assert_eq!(outcome, ProcessOutcome::Checkpoint(MintStatus::Completed));

    let reply = call(&api.router, "GET", "/v1/events/E1/status", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json,
        json!({
            "event_id": "E1",
            "total_checkins": 3,
            "with_wallet": 2,
            "minted": 1,
            "pending": 1,
            "failed": 0,
            "skipped": 1,
        })
    );

    let jobs = call(&api.router, "GET", "/v1/events/E1/jobs", None, None).await;
    assert_eq!(jobs.json["count"], 3);
    let statuses: Vec<&str> = jobs.json["jobs"].as_array().expect("jobs").iter().filter_map(|j| j["status"].as_str()).collect();
    assert!(statuses.contains(&"COMPLETED"));
    assert!(statuses.contains(&"SKIPPED"));
}

#[tokio::test]
async fn unknown_event_has_empty_summary() {
    let api = test_api(None);
    let reply = call(&api.router, "GET", "/v1/events/nope/status", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["total_checkins"], 0);
    assert_eq!(reply.json["minted"], 0);
}

#[tokio::test]
async fn bulk_mint_requires_operator_token() {
    let mut api = test_api(Some("op-token"));
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;
    call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c2", "E1", None))).await;
    while api.ready.try_recv().is_ok() {}

    let denied = call(&api.router, "POST", "/v1/events/E1/bulk-mint", None, None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    let wrong = call(&api.router, "POST", "/v1/events/E1/bulk-mint", Some("guess"), None).await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let reply = call(&api.router, "POST", "/v1/events/E1/bulk-mint", Some("op-token"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json, json!({ "total": 1, "queued": 1, "duplicates": 0, "errors": 0 }));
    assert!(api.ready.try_recv().is_ok());
}
