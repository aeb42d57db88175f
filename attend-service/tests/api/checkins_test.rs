use super::{call, check_in, test_api, ALICE, BOB};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn single_checkin_is_queued_then_deduplicated() {
    let mut api = test_api(None);

    let first = call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;
    assert_eq!(first.status, StatusCode::ACCEPTED);
    assert_eq!(first.json["result"], "enqueued");
    assert_eq!(first.json["status"], "PENDING");
    assert_eq!(first.json["created"], true);
    let job_id = first.json["job_id"].as_str().expect("job id").to_string();
    assert!(job_id.starts_with("0x"));
    assert_eq!(api.ready.try_recv().map(|id| format!("{:#x}", id)).ok(), Some(job_id));

    let again = call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.json["result"], "deduplicated");

    let snapshot = api.state.metrics.snapshot();
    assert_eq!(snapshot.checkins_recorded, 1);
    assert_eq!(snapshot.checkins_duplicate, 1);
    assert_eq!(snapshot.jobs_created, 1);
}

#[tokio::test]
async fn checkin_without_wallet_is_skipped() {
    let api = test_api(None);
    let reply = call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c2", "E1", None))).await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.json["status"], "SKIPPED");
    assert_eq!(api.ledger.estimate_calls(), 0);
}

#[tokio::test]
async fn malformed_checkins_are_rejected() {
    let api = test_api(None);

    let missing_field = call(&api.router, "POST", "/v1/checkins", None, Some(json!({ "checkInId": "c3" }))).await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_field.json["error"]["code"], "BadRequest");

    let mut bad_time = check_in("c4", "E1", Some(ALICE));
    bad_time["occurredAt"] = json!("yesterday");
    let reply = call(&api.router, "POST", "/v1/checkins", None, Some(bad_time)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json["error"]["code"], "InvalidCheckIn");

    assert_eq!(api.state.metrics.snapshot().checkins_rejected, 2);
    assert!(api.store.get_checkin(&"c4".into()).expect("get").is_none());
}

#[tokio::test]
async fn batch_reports_each_item_in_order() {
    let api = test_api(None);
    let mut invalid = check_in("b3", "E1", Some(BOB));
    invalid["eventId"] = json!("   ");
    let batch = json!([check_in("b1", "E1", Some(ALICE)), check_in("b1", "E1", Some(ALICE)), invalid, check_in("b4", "E1", Some(BOB))]);

    let reply = call(&api.router, "POST", "/v1/checkins", None, Some(batch)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["total"], 4);
    assert_eq!(reply.json["queued"], 2);
    assert_eq!(reply.json["duplicates"], 1);
    assert_eq!(reply.json["errors"], 1);
    let results = reply.json["results"].as_array().expect("results");
    assert_eq!(results[0]["result"], "queued");
    assert_eq!(results[1]["result"], "duplicate");
    assert_eq!(results[2]["result"], "error");
    assert_eq!(results[3]["check_in_id"], "b4");
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let api = test_api(None);
    let mut big = check_in("c5", "E1", Some(ALICE));
    big["attendeeName"] = json!("x".repeat(128 * 1024));
    let reply = call(&api.router, "POST", "/v1/checkins", None, Some(big)).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
}
