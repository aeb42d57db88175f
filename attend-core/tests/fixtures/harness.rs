#![allow(dead_code)]

use crate::fixtures::{TEST_CONTRACT, TEST_ORGANIZER, TEST_SIGNER_SEED};
use attend_core::application::{
    AttendanceDedupOracle, CheckInIngestor, ConfirmationWatcher, CoordinatorConfig, MintCoordinator, MintObserver, ProcessOutcome, ReadyQueue,
    TransactionSubmitter,
};
use attend_core::domain::{MetadataTemplate, MintJob, MintStatus};
use attend_core::foundation::{JobId, WalletAddress};
use attend_core::infrastructure::ledger::{LedgerClient, SimulatedLedger};
use attend_core::infrastructure::signer::LocalSigner;
use attend_core::infrastructure::storage::{RocksStatusStore, StatusStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Records every status change in order.
#[derive(Default)]
pub struct RecordingObserver {
    pub transitions: Mutex<Vec<(JobId, MintStatus, MintStatus)>>,
}

impl RecordingObserver {
    pub fn path_of(&self, job_id: &JobId) -> Vec<MintStatus> {
        let transitions = self.transitions.lock().expect("lock");
        let mut path: Vec<MintStatus> = Vec::new();
        for (_, from, to) in transitions.iter().filter(|(id, _, _)| id == job_id) {
            if path.is_empty() {
                path.push(*from);
            }
            path.push(*to);
        }
        path
    }
}

impl MintObserver for RecordingObserver {
    fn on_status_changed(&self, job: &MintJob, from: MintStatus, to: MintStatus) {
        self.transitions.lock().expect("lock").push((job.job_id, from, to));
    }
}

pub fn test_coordinator_config() -> CoordinatorConfig {
    CoordinatorConfig {
        max_attempts: 5,
        retry_base_delay_ms: 0,
        retry_max_delay_ms: 0,
        confirmation_timeout: Duration::from_secs(60),
        ledger_concurrency: 4,
    }
}

pub struct Pipeline {
    pub dir: TempDir,
    pub store: Arc<RocksStatusStore>,
    pub ledger: Arc<SimulatedLedger>,
    pub observer: Arc<RecordingObserver>,
    pub coordinator: Arc<MintCoordinator>,
    pub ingestor: CheckInIngestor,
    pub ready: mpsc::Receiver<JobId>,
}

pub fn pipeline() -> Pipeline {
    pipeline_with(test_coordinator_config())
}

pub fn pipeline_with(config: CoordinatorConfig) -> Pipeline {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(RocksStatusStore::open_in_dir(dir.path(), false).expect("open rocksdb"));
    let ledger = Arc::new(SimulatedLedger::new());
    let client: Arc<dyn LedgerClient> = ledger.clone();
    let organizer = WalletAddress::from(TEST_ORGANIZER);
    let signer = Arc::new(LocalSigner::from_seed(organizer.clone(), &TEST_SIGNER_SEED).expect("signer"));
    let observer = Arc::new(RecordingObserver::default());

    let coordinator = Arc::new(MintCoordinator::new(
        store.clone(),
        AttendanceDedupOracle::new(client.clone()),
        TransactionSubmitter::new(client.clone(), signer, TEST_CONTRACT, organizer),
        ConfirmationWatcher::new(client),
        observer.clone(),
        config,
        MetadataTemplate { image_url: "https://img.example/attendance.png".to_string(), default_location: "Virtual".to_string() },
    ));
    let (queue, ready) = ReadyQueue::channel(256);
    let ingestor = CheckInIngestor::new(store.clone(), coordinator.clone(), queue, observer.clone());
    Pipeline { dir, store, ledger, observer, coordinator, ingestor, ready }
}

impl Pipeline {
    /// Processes queued jobs one pass each until the ready queue is empty.
    pub async fn drain(&mut self) -> Vec<(JobId, ProcessOutcome)> {
        let mut outcomes = Vec::new();
        while let Ok(job_id) = self.ready.try_recv() {
            let outcome = self.coordinator.process(&job_id).await.expect("process");
            outcomes.push((job_id, outcome));
        }
        outcomes
    }

    /// Runs passes until the job is terminal, bounded by `max_passes`.
    pub async fn settle(&self, job_id: &JobId, max_passes: usize) -> MintJob {
        for _ in 0..max_passes {
            let job = self.job(job_id);
            if job.is_terminal() {
                return job;
            }
            self.coordinator.process(job_id).await.expect("process");
        }
        self.job(job_id)
    }

    pub fn job(&self, job_id: &JobId) -> MintJob {
        self.store.get(job_id).expect("get job").expect("job exists")
    }
}
