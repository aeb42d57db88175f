//! Ledger client surface and its adapters.
//!
//! The pipeline needs exactly four things from a ledger: cost estimation, submission of a signed
//! transaction, a status subscription for a submitted hash, and the read-only attendance query.

mod circuit_breaker;
mod guarded;
mod http;
mod retry;
mod simulated;

pub use circuit_breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
pub use guarded::GuardedLedger;
pub use http::HttpLedgerGateway;
pub use retry::retry_transient;
pub use simulated::{SimulatedLedger, SimulatedOutcome};

use crate::domain::{CostEstimate, MintCall, SignedTransaction, TxStatusUpdate};
use crate::foundation::{EventId, PipelineError, TxHash, WalletAddress};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Status updates for one transaction. Dropping the stream releases the subscription.
pub type TxStatusStream = BoxStream<'static, Result<TxStatusUpdate, PipelineError>>;

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn estimate_cost(&self, call: &MintCall) -> Result<CostEstimate, PipelineError>;

    /// Returns once the transaction pool accepted the transaction.
    async fn submit_signed(&self, tx: &SignedTransaction) -> Result<TxHash, PipelineError>;

    async fn subscribe_status(&self, tx_hash: &TxHash) -> Result<TxStatusStream, PipelineError>;

    /// Whether `wallet` already holds an attendance token for `event_id`.
    async fn has_attended(&self, event_id: &EventId, wallet: &WalletAddress) -> Result<bool, PipelineError>;
}
