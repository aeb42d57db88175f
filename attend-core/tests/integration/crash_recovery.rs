use crate::fixtures::{pipeline, CheckInBuilder, TEST_CONTRACT, TEST_ORGANIZER, TEST_SIGNER_SEED};
use attend_core::application::{IngestOutcome, ProcessOutcome, TransactionSubmitter};
use attend_core::domain::{JobErrorKind, MintStatus};
use attend_core::foundation::WalletAddress;
use attend_core::infrastructure::ledger::LedgerClient;
use attend_core::infrastructure::signer::LocalSigner;
use attend_core::infrastructure::storage::StatusStore;
use std::sync::Arc;

fn job_id_of(outcome: IngestOutcome) -> attend_core::foundation::JobId {
    match outcome {
        IngestOutcome::Enqueued { job_id, .. } => job_id,
        IngestOutcome::Deduplicated => panic!("expected a new job"),
    }
}

#[tokio::test]
async fn awaiting_confirmation_resumes_watching_the_recorded_hash() {
    let p = pipeline();
    let job_id = job_id_of(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));

    // Previous process submitted and crashed while waiting.
    let client: Arc<dyn LedgerClient> = p.ledger.clone();
    let organizer = WalletAddress::from(TEST_ORGANIZER);
    let signer = Arc::new(LocalSigner::from_seed(organizer.clone(), &TEST_SIGNER_SEED).expect("signer"));
    let submitter = TransactionSubmitter::new(client, signer, TEST_CONTRACT, organizer);
    let mut job = p.job(&job_id);
    let tx_hash = submitter.submit(&job).await.expect("submit");
    job.status = MintStatus::AwaitingConfirmation;
    job.attempt = 1;
    job.transaction_hash = Some(tx_hash);
    p.store.upsert(&job).expect("upsert");

    let candidates = p.coordinator.recovery_candidates().expect("recovery");
    assert_eq!(candidates.len(), 1);
    assert_eq!(p.coordinator.process(&job_id).await.expect("process"), ProcessOutcome::Checkpoint(MintStatus::Completed));

    let record = p.store.get_nft_record(&job_id).expect("get").expect("record");
    assert_eq!(record.transaction_hash, tx_hash);
    assert_eq!(p.ledger.submit_calls(), 1);
    assert_eq!(p.job(&job_id).attempt, 1);
}

#[tokio::test]
async fn interrupted_submission_retries_through_dedup() {
    let p = pipeline();
    let job_id = job_id_of(p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest"));
    let mut job = p.job(&job_id);
    job.status = MintStatus::Submitting;
    job.attempt = 1;
    p.store.upsert(&job).expect("upsert");

    assert_eq!(p.coordinator.process(&job_id).await.expect("process"), ProcessOutcome::Checkpoint(MintStatus::Failed));
    assert_eq!(p.job(&job_id).last_error.map(|e| e.kind), Some(JobErrorKind::Interrupted));

    let job = p.settle(&job_id, 3).await;
    assert_eq!(job.status, MintStatus::Completed);
    assert_eq!(job.attempt, 2);
    assert_eq!(p.ledger.attendance_calls(), 1);
}
