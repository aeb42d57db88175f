use super::{call, check_in, test_api, ALICE};
use attend_core::domain::MintStatus;
use attend_core::foundation::JobId;
use attend_core::infrastructure::ledger::SimulatedOutcome;
use axum::http::StatusCode;

async fn reverted_job(api: &super::TestApi) -> JobId {
    api.ledger.push_outcome(SimulatedOutcome::Revert("Module(attendance::EventClosed)".to_string()));
    let reply = call(&api.router, "POST", "/v1/checkins", None, Some(check_in("c1", "E1", Some(ALICE)))).await;
    let job_id: JobId = reply.json["job_id"].as_str().expect("job id").parse().expect("parse");
    api.state.coordinator.process(&job_id).await.expect("process");
    job_id
}

#[tokio::test]
async fn job_detail_reports_permanent_failure() {
    let api = test_api(None);
    let job_id = reverted_job(&api).await;

    let reply = call(&api.router, "GET", &format!("/v1/jobs/{:#x}", job_id), None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["job"]["status"], "FAILED");
    assert_eq!(reply.json["job"]["last_error"]["kind"], "LedgerRevert");
    assert_eq!(reply.json["permanently_failed"], true);
    assert!(reply.json["nft"].is_null());
}

#[tokio::test]
async fn job_detail_errors() {
    let api = test_api(None);
    let missing = call(&api.router, "GET", &format!("/v1/jobs/0x{}", "11".repeat(32)), None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json["error"]["code"], "JobNotFound");

    let malformed = call(&api.router, "GET", "/v1/jobs/not-a-job", None, None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn operator_retry_resets_permanently_failed_job() {
    let mut api = test_api(Some("op-token"));
    let job_id = reverted_job(&api).await;
    while api.ready.try_recv().is_ok() {}
    let uri = format!("/v1/jobs/{:#x}/retry", job_id);

    let denied = call(&api.router, "POST", &uri, None, None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    let reply = call(&api.router, "POST", &uri, Some("op-token"), None).await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.json["status"], "PENDING");
    assert_eq!(reply.json["attempt"], 0);
    assert_eq!(reply.json["last_error"]["kind"], "LedgerRevert");
    assert_eq!(api.ready.try_recv().ok(), Some(job_id));

    api.state.coordinator.process(&job_id).await.expect("process");
    let job = api.store.get(&job_id).expect("get").expect("job");
    assert_eq!(job.status, MintStatus::Completed);

    let again = call(&api.router, "POST", &uri, Some("op-token"), None).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.json["error"]["code"], "OperatorActionRejected");
}

#[tokio::test]
async fn retry_of_held_job_is_busy() {
    let api = test_api(None);
    let job_id = reverted_job(&api).await;
    let _guard = api.state.coordinator.locks().try_acquire(&job_id).expect("lock");

    let reply = call(&api.router, "POST", &format!("/v1/jobs/{:#x}/retry", job_id), None, None).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json["error"]["code"], "JobBusy");
}
