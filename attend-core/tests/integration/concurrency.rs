use crate::fixtures::{pipeline, CheckInBuilder, ALICE_WALLET, BOB_WALLET, TEST_EVENT_ID};
use attend_core::application::{IngestOutcome, ProcessOutcome};
use attend_core::domain::MintStatus;
use attend_core::foundation::{EventId, JobId, WalletAddress};
use attend_core::infrastructure::storage::StatusStore;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test]
async fn concurrent_executions_of_one_job_single_winner() {
    let p = pipeline();
    p.ledger.set_call_latency(Duration::from_millis(50));
    let IngestOutcome::Enqueued { job_id, .. } = p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest") else {
        panic!("expected a job");
    };

    let (first, second) = tokio::join!(p.coordinator.process(&job_id), p.coordinator.process(&job_id));
    let mut outcomes = vec![first.expect("first"), second.expect("second")];
    outcomes.sort_by_key(|o| matches!(o, ProcessOutcome::Deferred));
    assert_eq!(outcomes, vec![ProcessOutcome::Checkpoint(MintStatus::Completed), ProcessOutcome::Deferred]);
    assert_eq!(p.ledger.attendance_calls(), 1);
    assert_eq!(p.ledger.submit_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_flood_produces_at_most_one_token_per_pair() {
    let p = pipeline();
    let mut job_ids = HashSet::new();
    for n in 0..20 {
        let wallet = if n % 2 == 0 { ALICE_WALLET } else { BOB_WALLET };
        // Same check-in id delivered twice, plus distinct ids for the same pair.
        for _ in 0..2 {
            let wire = CheckInBuilder::default().check_in_id(format!("c{}", n)).wallet(Some(wallet)).build();
            if let IngestOutcome::Enqueued { job_id, .. } = p.ingestor.ingest_wire(wire).expect("ingest") {
                job_ids.insert(job_id);
            }
        }
    }
    assert_eq!(job_ids.len(), 2);

    let triggers: Vec<JobId> = job_ids.iter().copied().cycle().take(16).collect();
    let results = join_all(triggers.iter().map(|job_id| p.coordinator.process(job_id))).await;
    assert!(results.iter().all(|r| r.is_ok()));
    for job_id in &job_ids {
        p.settle(job_id, 5).await;
    }

    let event = EventId::from(TEST_EVENT_ID);
    for wallet in [ALICE_WALLET, BOB_WALLET] {
        assert_eq!(p.ledger.mint_count(&event, &WalletAddress::from(wallet)), 1);
    }
    let jobs = p.store.list_by_event(&event).expect("list");
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|job| job.status == MintStatus::Completed));
    assert_eq!(p.store.list_nft_records_by_event(&event).expect("records").len(), 2);
}
