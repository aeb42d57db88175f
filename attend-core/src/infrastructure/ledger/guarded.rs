use super::circuit_breaker::{BreakerState, CircuitBreaker};
use super::retry::retry_transient;
use super::{LedgerClient, TxStatusStream};
use crate::domain::{CostEstimate, MintCall, SignedTransaction};
use crate::foundation::{EventId, PipelineError, TxHash, WalletAddress};
use crate::infrastructure::config::LedgerConfig;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Wraps a ledger client with a transport timeout, transient-error retry and one circuit breaker per operation.
pub struct GuardedLedger {
    inner: Arc<dyn LedgerClient>,
    config: LedgerConfig,
    estimate: CircuitBreaker,
    submit: CircuitBreaker,
    status: CircuitBreaker,
    attendance: CircuitBreaker,
}

impl GuardedLedger {
    pub fn new(inner: Arc<dyn LedgerClient>, config: LedgerConfig) -> Self {
        let breaker = config.circuit_breaker;
        Self {
            inner,
            config,
            estimate: CircuitBreaker::new("estimate_cost", breaker),
            submit: CircuitBreaker::new("submit_signed", breaker),
            status: CircuitBreaker::new("subscribe_status", breaker),
            attendance: CircuitBreaker::new("has_attended", breaker),
        }
    }

    pub fn breaker_states(&self) -> Vec<(&'static str, BreakerState)> {
        [&self.estimate, &self.submit, &self.status, &self.attendance].iter().map(|b| (b.name(), b.state())).collect()
    }

    async fn guarded<T, F, Fut>(&self, breaker: &CircuitBreaker, mut op: F) -> Result<T, PipelineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        let operation = breaker.name();
        if !breaker.allow() {
            return Err(PipelineError::CircuitOpen(operation.to_string()));
        }
        let timeout = self.config.request_timeout();
        let result = retry_transient(operation, &self.config.transport_retry, || with_timeout(operation, timeout, op())).await;
        match &result {
            Err(err) if err.is_transient() => breaker.record_failure(),
            // A definitive rejection still proves the ledger is reachable.
            _ => breaker.record_success(),
        }
        result
    }
}

async fn with_timeout<T>(
    operation: &str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, PipelineError>>,
) -> Result<T, PipelineError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::Timeout { operation: operation.to_string(), timeout_ms: timeout.as_millis() as u64 }),
    }
}

#[async_trait]
impl LedgerClient for GuardedLedger {
    async fn estimate_cost(&self, call: &MintCall) -> Result<CostEstimate, PipelineError> {
        self.guarded(&self.estimate, || self.inner.estimate_cost(call)).await
    }

    async fn submit_signed(&self, tx: &SignedTransaction) -> Result<TxHash, PipelineError> {
        self.guarded(&self.submit, || self.inner.submit_signed(tx)).await
    }

    async fn subscribe_status(&self, tx_hash: &TxHash) -> Result<TxStatusStream, PipelineError> {
        self.guarded(&self.status, || self.inner.subscribe_status(tx_hash)).await
    }

    async fn has_attended(&self, event_id: &EventId, wallet: &WalletAddress) -> Result<bool, PipelineError> {
        self.guarded(&self.attendance, || self.inner.has_attended(event_id, wallet)).await
    }
}
