//! Drives mint jobs: startup recovery, ready-queue hand-offs and a periodic due-job scan.
//!
//! Each dispatch runs `MintCoordinator::process` on its own task. The coordinator's job locks
//! make a second dispatch of a held job a no-op, and its ledger permits bound concurrent ledger
//! work, so the scheduler itself keeps no per-job state.

use super::shutdown::wait_for_shutdown;
use attend_core::application::{MintCoordinator, ProcessOutcome};
use attend_core::foundation::{now_nanos, JobId, PipelineError};
use attend_core::infrastructure::config::PipelineConfig;
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    pub scan_interval: Duration,
}

impl From<&PipelineConfig> for SchedulerConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self { scan_interval: Duration::from_millis(config.scan_interval_ms.max(1)) }
    }
}

type WorkerResult = (JobId, Result<ProcessOutcome, PipelineError>);

pub async fn run_mint_scheduler(
    coordinator: Arc<MintCoordinator>,
    mut ready: mpsc::Receiver<JobId>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), PipelineError> {
    let mut workers: JoinSet<WorkerResult> = JoinSet::new();

    let recovered = coordinator.recovery_candidates()?;
    info!(
        "mint scheduler starting recovered_jobs={} scan_interval_ms={} ledger_concurrency={}",
        recovered.len(),
        config.scan_interval.as_millis(),
        coordinator.config().ledger_concurrency
    );
    for job in recovered {
        dispatch(&mut workers, &coordinator, job.job_id);
    }

    let mut scan = tokio::time::interval(config.scan_interval);
    scan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => break,
            Some(job_id) = ready.recv() => dispatch(&mut workers, &coordinator, job_id),
            _ = scan.tick() => match coordinator.due_jobs(now_nanos()) {
                Ok(due) => {
                    if !due.is_empty() {
                        debug!("due-job scan dispatching count={}", due.len());
                    }
                    for job_id in due {
                        dispatch(&mut workers, &coordinator, job_id);
                    }
                }
                Err(err) => warn!("due-job scan failed error={}", err),
            },
            Some(joined) = workers.join_next(), if !workers.is_empty() => reap(joined),
        }
    }

    info!("mint scheduler stopping in_flight_workers={}", workers.len());
    // Aborted jobs keep their last persisted status; startup recovery resumes them.
    workers.shutdown().await;
    Ok(())
}

fn dispatch(workers: &mut JoinSet<WorkerResult>, coordinator: &Arc<MintCoordinator>, job_id: JobId) {
    if coordinator.locks().is_locked(&job_id) {
        trace!("job already executing, skipping dispatch job_id={:#x}", job_id);
        return;
    }
    let coordinator = coordinator.clone();
    workers.spawn(async move {
        let result = coordinator.process(&job_id).await;
        (job_id, result)
    });
}

fn reap(joined: Result<WorkerResult, JoinError>) {
    match joined {
        Ok((job_id, Ok(outcome))) => trace!("mint worker finished job_id={:#x} outcome={:?}", job_id, outcome),
        Ok((job_id, Err(err))) => warn!("mint worker error job_id={:#x} error={}", job_id, err),
        Err(err) if err.is_panic() => error!("mint worker panicked error={}", err),
        Err(err) => debug!("mint worker cancelled error={}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_core::application::{
        AttendanceDedupOracle, CheckInIngestor, ConfirmationWatcher, CoordinatorConfig, IngestOutcome, NoopObserver, ReadyQueue,
        TransactionSubmitter,
    };
    use attend_core::domain::{CheckInWire, MetadataTemplate, MintStatus};
    use attend_core::infrastructure::ledger::{LedgerClient, SimulatedLedger};
    use attend_core::infrastructure::signer::LocalSigner;
    use attend_core::infrastructure::storage::{MemoryStatusStore, StatusStore};
    use attend_core::foundation::WalletAddress;

    const ORGANIZER: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    #[tokio::test]
    async fn queued_job_completes_and_scheduler_stops_on_shutdown() {
        let store: Arc<dyn StatusStore> = Arc::new(MemoryStatusStore::new());
        let ledger = Arc::new(SimulatedLedger::new());
        let client: Arc<dyn LedgerClient> = ledger.clone();
        let organizer = WalletAddress::from(ORGANIZER);
        let signer = Arc::new(LocalSigner::from_seed(organizer.clone(), &[3u8; 32]).expect("signer"));
        let config = CoordinatorConfig { retry_base_delay_ms: 0, retry_max_delay_ms: 0, ..CoordinatorConfig::default() };
        let coordinator = Arc::new(MintCoordinator::new(
            store.clone(),
            AttendanceDedupOracle::new(client.clone()),
            TransactionSubmitter::new(client.clone(), signer, ORGANIZER, organizer),
            ConfirmationWatcher::new(client),
            Arc::new(NoopObserver),
            config,
            MetadataTemplate { image_url: String::new(), default_location: "Virtual".to_string() },
        ));
        let (queue, ready) = ReadyQueue::channel(16);
        let ingestor = CheckInIngestor::new(store.clone(), coordinator.clone(), queue, Arc::new(NoopObserver));
        let (shutdown_tx, shutdown_rx) = super::super::shutdown::shutdown_channel();

        let scheduler = tokio::spawn(run_mint_scheduler(
            coordinator.clone(),
            ready,
            SchedulerConfig { scan_interval: Duration::from_millis(20) },
            shutdown_rx,
        ));

        let wire = CheckInWire {
            check_in_id: "c1".to_string(),
            event_id: "E1".to_string(),
            wallet_address: Some("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string()),
            attendee_name: "Alice".to_string(),
            occurred_at: "2024-03-15T10:30:00Z".to_string(),
            event_name: None,
            event_date: None,
            location: None,
        };
        let IngestOutcome::Enqueued { job_id, .. } = ingestor.ingest_wire(wire).expect("ingest") else {
            panic!("expected a queued job");
        };

        let completed = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if store.get(&job_id).expect("get").map(|job| job.status) == Some(MintStatus::Completed) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(completed.is_ok(), "job did not complete");
        assert_eq!(ledger.submit_calls(), 1);

        shutdown_tx.send(true).expect("send shutdown");
        let stopped = tokio::time::timeout(Duration::from_secs(5), scheduler).await.expect("scheduler stops");
        assert!(stopped.expect("join").is_ok());
    }
}
