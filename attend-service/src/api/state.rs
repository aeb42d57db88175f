use crate::service::metrics::Metrics;
use attend_core::application::{CheckInIngestor, MintCoordinator, ReadyQueue, StatusQueries};
use attend_core::infrastructure::ledger::GuardedLedger;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub ingestor: Arc<CheckInIngestor>,
    pub coordinator: Arc<MintCoordinator>,
    pub queries: StatusQueries,
    /// Operator retries are pushed here so they do not wait for the next scan.
    pub queue: ReadyQueue,
    /// Only read for breaker states in `/ready`.
    pub ledger: Arc<GuardedLedger>,
    pub metrics: Arc<Metrics>,
    pub operator_token: Option<String>,
    pub max_body_bytes: usize,
}
