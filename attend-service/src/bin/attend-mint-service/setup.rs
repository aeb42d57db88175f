use attend_core::application::{
    AttendanceDedupOracle, AuditLoggingObserver, CheckInIngestor, CompositeObserver, ConfirmationWatcher, CoordinatorConfig,
    MintCoordinator, MintObserver, ReadyQueue, StatusQueries, TransactionSubmitter,
};
use attend_core::foundation::{JobId, PipelineError, WalletAddress};
use attend_core::infrastructure::config::{AppConfig, LedgerMode};
use attend_core::infrastructure::ledger::{GuardedLedger, HttpLedgerGateway, LedgerClient, SimulatedLedger};
use attend_core::infrastructure::logging::init_logger;
use attend_core::infrastructure::signer::{EnvSecretStore, LocalSigner, Signer};
use attend_core::infrastructure::storage::{RocksStatusStore, StatusStore};
use attend_service::service::metrics::Metrics;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Throwaway key for dry-run deployments without a configured seed; nothing it signs reaches a ledger.
const DRY_RUN_SIGNER_SEED: [u8; 32] = [0x5a; 32];

pub fn init_logging(app_config: &AppConfig, filters_override: Option<&str>) -> Result<(), PipelineError> {
    let filters = filters_override.unwrap_or(&app_config.service.log_filters);
    init_logger(app_config.service.log_dir.as_deref(), filters)
}

pub fn init_storage(app_config: &AppConfig) -> Result<Arc<RocksStatusStore>, PipelineError> {
    let store = RocksStatusStore::open_in_dir(&app_config.service.data_dir, app_config.service.allow_schema_wipe)?;
    Ok(Arc::new(store))
}

pub fn init_ledger(app_config: &AppConfig) -> Result<Arc<GuardedLedger>, PipelineError> {
    let inner: Arc<dyn LedgerClient> = match app_config.ledger.mode {
        LedgerMode::Http => Arc::new(HttpLedgerGateway::new(&app_config.ledger)?),
        LedgerMode::DryRun => {
            warn!("ledger dry-run mode: transactions are simulated in memory and nothing is minted");
            Arc::new(SimulatedLedger::new())
        }
    };
    Ok(Arc::new(GuardedLedger::new(inner, app_config.ledger.clone())))
}

pub fn init_signer(app_config: &AppConfig) -> Result<Arc<dyn Signer>, PipelineError> {
    let organizer = WalletAddress::new(app_config.signer.organizer_wallet.trim());
    let secrets = EnvSecretStore::from_env();
    match LocalSigner::from_secret_store(&secrets, &app_config.signer.secret_name, organizer.clone()) {
        Ok(signer) => Ok(Arc::new(signer)),
        Err(PipelineError::SecretNotFound { name, .. }) if app_config.ledger.mode == LedgerMode::DryRun => {
            warn!("signer secret missing, using a throwaway dry-run key secret_name={}", name);
            Ok(Arc::new(LocalSigner::from_seed(organizer, &DRY_RUN_SIGNER_SEED)?))
        }
        Err(err) => Err(err),
    }
}

pub struct Pipeline {
    pub coordinator: Arc<MintCoordinator>,
    pub ingestor: Arc<CheckInIngestor>,
    pub queries: StatusQueries,
    pub queue: ReadyQueue,
    pub ready: mpsc::Receiver<JobId>,
}

pub fn build_pipeline(
    app_config: &AppConfig,
    store: Arc<dyn StatusStore>,
    ledger: Arc<GuardedLedger>,
    signer: Arc<dyn Signer>,
    metrics: Arc<Metrics>,
) -> Pipeline {
    let mut observers = CompositeObserver::new();
    observers.add_observer(metrics);
    observers.add_observer(Arc::new(AuditLoggingObserver));
    let observer: Arc<dyn MintObserver> = Arc::new(observers);

    let client: Arc<dyn LedgerClient> = ledger;
    let organizer = WalletAddress::new(app_config.signer.organizer_wallet.trim());
    let coordinator = Arc::new(MintCoordinator::new(
        store.clone(),
        AttendanceDedupOracle::new(client.clone()),
        TransactionSubmitter::new(client.clone(), signer, app_config.ledger.contract_address.trim(), organizer),
        ConfirmationWatcher::new(client),
        observer.clone(),
        CoordinatorConfig::from(&app_config.pipeline),
        app_config.metadata.template(),
    ));
    let (queue, ready) = ReadyQueue::channel(app_config.pipeline.queue_capacity);
    let ingestor = Arc::new(CheckInIngestor::new(store.clone(), coordinator.clone(), queue.clone(), observer));
    info!(
        "mint pipeline assembled ledger_mode={} contract={} max_attempts={} worker_concurrency={} queue_capacity={}",
        app_config.ledger.mode,
        app_config.ledger.contract_address,
        app_config.pipeline.max_attempts,
        app_config.pipeline.worker_concurrency,
        app_config.pipeline.queue_capacity
    );
    Pipeline { coordinator, ingestor, queries: StatusQueries::new(store), queue, ready }
}
