use crate::fixtures::{pipeline, pipeline_with, test_coordinator_config, CheckInBuilder, ALICE_WALLET, TEST_EVENT_ID};
use attend_core::application::{IngestOutcome, ProcessOutcome};
use attend_core::domain::{JobErrorKind, MintStatus, SkipReason};
use attend_core::foundation::{EventId, WalletAddress};
use attend_core::infrastructure::ledger::SimulatedOutcome;
use attend_core::infrastructure::storage::StatusStore;

fn enqueued_job(outcome: IngestOutcome) -> attend_core::foundation::JobId {
    match outcome {
        IngestOutcome::Enqueued { job_id, .. } => job_id,
        IngestOutcome::Deduplicated => panic!("expected a new job"),
    }
}

#[tokio::test]
async fn single_check_in_mints_one_token() {
    let mut p = pipeline();
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));

    let outcomes = p.drain().await;
    assert_eq!(outcomes, vec![(job_id, ProcessOutcome::Checkpoint(MintStatus::Completed))]);
    assert_eq!(
        p.observer.path_of(&job_id),
        vec![
            MintStatus::Pending,
            MintStatus::CheckingDedup,
            MintStatus::Submitting,
            MintStatus::AwaitingConfirmation,
            MintStatus::Completed
        ]
    );

    let record = p.store.get_nft_record(&job_id).expect("get").expect("nft record");
    assert_eq!(record.owner_wallet.as_str(), ALICE_WALLET);
    assert_eq!(record.event_id.as_str(), TEST_EVENT_ID);
    assert_eq!(record.metadata_snapshot.name, "RustConf - Attendance NFT");
    assert_eq!(p.ledger.mint_count(&EventId::from(TEST_EVENT_ID), &WalletAddress::from(ALICE_WALLET)), 1);
}

#[tokio::test]
async fn redelivered_check_in_is_deduplicated_at_ingestion() {
    let mut p = pipeline();
    let check_in = CheckInBuilder::default().build();
    enqueued_job(p.ingestor.ingest_wire(check_in.clone()).expect("ingest"));
    assert_eq!(p.ingestor.ingest_wire(check_in).expect("ingest"), IngestOutcome::Deduplicated);

    assert_eq!(p.store.list_by_event(&EventId::from(TEST_EVENT_ID)).expect("list").len(), 1);
    assert_eq!(p.drain().await.len(), 1);
    assert_eq!(p.ledger.submit_calls(), 1);
}

#[tokio::test]
async fn check_in_without_wallet_is_skipped_without_submission() {
    let mut p = pipeline();
    let outcome = p.ingestor.ingest_wire(CheckInBuilder::default().wallet(None).build()).expect("ingest");
    let IngestOutcome::Enqueued { job_id, status, .. } = outcome else {
        panic!("expected a job, got {:?}", outcome);
    };
    assert_eq!(status, MintStatus::Skipped);
    assert!(p.drain().await.is_empty());

    let job = p.job(&job_id);
    assert_eq!(job.skip_reason, Some(SkipReason::NoWallet));
    assert_eq!(job.last_error.map(|e| e.kind), Some(JobErrorKind::NoWallet));
    assert_eq!(p.ledger.attendance_calls(), 0);
    assert_eq!(p.ledger.submit_calls(), 0);
}

#[tokio::test]
async fn prior_attendance_skips_before_submission() {
    let mut p = pipeline();
    p.ledger.mark_attended(&EventId::from(TEST_EVENT_ID), &WalletAddress::from(ALICE_WALLET));
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));

    assert_eq!(p.drain().await, vec![(job_id, ProcessOutcome::Checkpoint(MintStatus::Skipped))]);
    let job = p.job(&job_id);
    assert_eq!(job.skip_reason, Some(SkipReason::AlreadyAttended));
    assert_eq!(p.ledger.estimate_calls(), 0);
    assert_eq!(p.ledger.submit_calls(), 0);
    assert!(p.store.get_nft_record(&job_id).expect("get").is_none());
}

#[tokio::test(start_paused = true)]
async fn repeated_confirmation_timeouts_exhaust_attempts() {
    let mut config = test_coordinator_config();
    config.max_attempts = 3;
    let p = pipeline_with(config);
    p.ledger.set_default_outcome(SimulatedOutcome::Stall);
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));

    let job = p.settle(&job_id, 10).await;
    assert!(job.is_permanently_failed());
    assert_eq!(job.attempt, 3);
    assert_eq!(job.last_error.as_ref().map(|e| e.kind), Some(JobErrorKind::ConfirmationTimeout));
    assert_eq!(p.ledger.submit_calls(), 3);
    assert_eq!(p.ledger.attendance_calls(), 3);
    assert_eq!(p.ledger.active_subscriptions(), 0);
    assert!(p.store.get_nft_record(&job_id).expect("get").is_none());
    assert_eq!(p.coordinator.process(&job_id).await.expect("process"), ProcessOutcome::Idle(MintStatus::Failed));
}

#[tokio::test(start_paused = true)]
async fn late_finality_is_caught_by_the_dedup_check() {
    let p = pipeline();
    p.ledger.push_outcome(SimulatedOutcome::LateFinalize);
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));

    assert_eq!(p.coordinator.process(&job_id).await.expect("process"), ProcessOutcome::Checkpoint(MintStatus::Failed));
    assert_eq!(p.job(&job_id).last_error.map(|e| e.kind), Some(JobErrorKind::ConfirmationTimeout));

    assert_eq!(p.coordinator.process(&job_id).await.expect("process"), ProcessOutcome::Checkpoint(MintStatus::Skipped));
    let job = p.job(&job_id);
    assert_eq!(job.skip_reason, Some(SkipReason::AlreadyAttended));
    assert_eq!(p.ledger.submit_calls(), 1);
    assert_eq!(p.ledger.mint_count(&EventId::from(TEST_EVENT_ID), &WalletAddress::from(ALICE_WALLET)), 1);
}

#[tokio::test]
async fn terminal_jobs_ignore_later_check_ins() {
    let mut p = pipeline();
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));
    p.drain().await;
    let completed = p.job(&job_id);
    assert_eq!(completed.status, MintStatus::Completed);

    for n in 2..6 {
        let outcome = p.ingestor.ingest_wire(CheckInBuilder::default().check_in_id(format!("c{}", n)).build()).expect("ingest");
        assert!(matches!(outcome, IngestOutcome::Enqueued { status: MintStatus::Completed, created: false, .. }));
    }
    assert!(p.drain().await.is_empty());
    assert_eq!(p.job(&job_id), completed);
    assert_eq!(p.ledger.submit_calls(), 1);
}

#[tokio::test]
async fn bulk_mint_requeues_unfinished_jobs_of_an_event() {
    let mut p = pipeline();
    p.ledger.fail_estimates(1);
    let job_id = enqueued_job(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));
    assert_eq!(p.drain().await, vec![(job_id, ProcessOutcome::Checkpoint(MintStatus::Failed))]);

    let report = p.ingestor.bulk_mint(&EventId::from(TEST_EVENT_ID)).expect("bulk mint");
    assert_eq!((report.total, report.queued, report.duplicates, report.errors), (1, 1, 0, 0));
    assert_eq!(p.drain().await, vec![(job_id, ProcessOutcome::Checkpoint(MintStatus::Completed))]);

    let report = p.ingestor.bulk_mint(&EventId::from(TEST_EVENT_ID)).expect("bulk mint");
    assert_eq!((report.total, report.queued, report.duplicates), (1, 0, 1));
}
