//! In-process ledger used by `--ledger dry-run` and by pipeline tests.
//!
//! A submission takes effect on the simulated chain at submit time; the status stream then
//! replays the milestones for it. Outcomes are consumed from a script, falling back to a default.

use super::{LedgerClient, TxStatusStream};
use crate::domain::ledger::{CONTRACT_MINTED_EVENT, EXTRINSIC_FAILED_EVENT, SYSTEM_MODULE};
use crate::domain::{BlockRef, CostEstimate, LedgerEvent, MintCall, SignedTransaction, TxStatusUpdate, UnsignedTransaction};
use crate::foundation::{BlockHash, EventId, PipelineError, TxHash, WalletAddress};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulatedOutcome {
    /// Pool, in-block, finalized with the contract's mint event.
    Finalize,
    /// Finalized with `System.ExtrinsicFailed`.
    Revert(String),
    /// Accepted into the pool, then silence.
    Stall,
    /// Lands on chain (attendance recorded) but the subscription goes silent after the pool.
    LateFinalize,
    /// Subscription closes after inclusion without ever reporting finality.
    EndStream,
}

#[derive(Default)]
struct Chain {
    script: VecDeque<SimulatedOutcome>,
    attended: HashSet<(EventId, WalletAddress)>,
    mints: HashMap<(EventId, WalletAddress), usize>,
    submissions: HashMap<TxHash, Vec<TxStatusUpdate>>,
    stalled: HashSet<TxHash>,
    next_block: u64,
    next_token_id: u64,
    failing_attendance_queries: usize,
    rejected_attendance_queries: usize,
    failing_subscriptions: usize,
    failing_estimates: usize,
    rejected_submissions: usize,
}

pub struct SimulatedLedger {
    chain: Mutex<Chain>,
    default_outcome: Mutex<SimulatedOutcome>,
    call_latency: Mutex<Duration>,
    step_delay: Mutex<Duration>,
    estimate_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    attendance_calls: AtomicUsize,
    subscriptions: AtomicUsize,
    active_subscriptions: Arc<AtomicUsize>,
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self {
            chain: Mutex::new(Chain { next_block: 1, next_token_id: 1, ..Chain::default() }),
            default_outcome: Mutex::new(SimulatedOutcome::Finalize),
            call_latency: Mutex::new(Duration::ZERO),
            step_delay: Mutex::new(Duration::ZERO),
            estimate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            attendance_calls: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_default_outcome(&self, outcome: SimulatedOutcome) {
        *self.default_outcome.lock() = outcome;
    }

    /// Outcome for the next submission; queued outcomes are used in order before the default.
    pub fn push_outcome(&self, outcome: SimulatedOutcome) {
        self.chain.lock().script.push_back(outcome);
    }

    pub fn mark_attended(&self, event_id: &EventId, wallet: &WalletAddress) {
        self.chain.lock().attended.insert((event_id.clone(), wallet.clone()));
    }

    pub fn fail_attendance_queries(&self, count: usize) {
        self.chain.lock().failing_attendance_queries = count;
    }

    /// Attendance queries answered with a definitive `LedgerError` instead of a transport error.
    pub fn reject_attendance_queries(&self, count: usize) {
        self.chain.lock().rejected_attendance_queries = count;
    }

    pub fn fail_subscriptions(&self, count: usize) {
        self.chain.lock().failing_subscriptions = count;
    }

    pub fn fail_estimates(&self, count: usize) {
        self.chain.lock().failing_estimates = count;
    }

    pub fn reject_submissions(&self, count: usize) {
        self.chain.lock().rejected_submissions = count;
    }

    /// Delay applied before every request/response call.
    pub fn set_call_latency(&self, latency: Duration) {
        *self.call_latency.lock() = latency;
    }

    /// Delay between consecutive status updates on a subscription.
    pub fn set_step_delay(&self, delay: Duration) {
        *self.step_delay.lock() = delay;
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn attendance_calls(&self) -> usize {
        self.attendance_calls.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Subscriptions whose stream has not been dropped yet.
    pub fn active_subscriptions(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    /// Tokens the contract actually issued for the pair.
    pub fn mint_count(&self, event_id: &EventId, wallet: &WalletAddress) -> usize {
        self.chain.lock().mints.get(&(event_id.clone(), wallet.clone())).copied().unwrap_or(0)
    }

    async fn latency(&self) {
        let latency = *self.call_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn next_block(chain: &mut Chain) -> BlockRef {
        let number = chain.next_block;
        chain.next_block += 1;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"simulated-block");
        hasher.update(&number.to_be_bytes());
        BlockRef { hash: BlockHash::from(*hasher.finalize().as_bytes()), number }
    }

    /// Executes the mint on the simulated chain and returns the finalized event log.
    fn execute(chain: &mut Chain, call: &MintCall) -> Vec<LedgerEvent> {
        let key = (call.event_id.clone(), call.recipient.clone());
        if !chain.attended.insert(key.clone()) {
            // mint_nft returns false for a wallet that already attended.
            return vec![LedgerEvent::new(SYSTEM_MODULE, "ExtrinsicSuccess")];
        }
        *chain.mints.entry(key).or_insert(0) += 1;
        let token_id = chain.next_token_id;
        chain.next_token_id += 1;
        vec![
            LedgerEvent::new("Contracts", CONTRACT_MINTED_EVENT)
                .with_field("nft_id", token_id.to_string())
                .with_field("event_id", call.event_id.as_str())
                .with_field("recipient", call.recipient.as_str()),
            LedgerEvent::new(SYSTEM_MODULE, "ExtrinsicSuccess"),
        ]
    }
}

struct SubscriptionGuard(Arc<AtomicUsize>);

impl SubscriptionGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }

    fn hold(&self) {}
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn estimate_cost(&self, call: &MintCall) -> Result<CostEstimate, PipelineError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.latency().await;
        {
            let mut chain = self.chain.lock();
            if chain.failing_estimates > 0 {
                chain.failing_estimates -= 1;
                return Err(PipelineError::GasEstimationFailed("simulated: contract dry-run trapped".to_string()));
            }
        }
        let weight = 1_000_000 + call.metadata_json.len() as u64 * 100;
        Ok(CostEstimate { gas_limit: weight, proof_size: 65_536, fee: weight / 10 })
    }

    async fn submit_signed(&self, tx: &SignedTransaction) -> Result<TxHash, PipelineError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.latency().await;
        let unsigned = UnsignedTransaction::from_signing_bytes(&tx.payload)
            .map_err(|err| PipelineError::SubmissionRejected(format!("undecodable payload: {err}")))?;
        let tx_hash = tx.hash();

        let default_outcome = self.default_outcome.lock().clone();
        let mut chain = self.chain.lock();
        if chain.rejected_submissions > 0 {
            chain.rejected_submissions -= 1;
            return Err(PipelineError::SubmissionRejected("simulated: pool rejected transaction".to_string()));
        }
        let outcome = chain.script.pop_front().unwrap_or(default_outcome);
        let in_block = Self::next_block(&mut chain);
        let updates = match &outcome {
            SimulatedOutcome::Finalize => {
                let events = Self::execute(&mut chain, &unsigned.call);
                vec![TxStatusUpdate::Pool, TxStatusUpdate::InBlock { block: in_block }, TxStatusUpdate::Finalized { block: in_block, events }]
            }
            SimulatedOutcome::Revert(reason) => {
                let events = vec![LedgerEvent::new(SYSTEM_MODULE, EXTRINSIC_FAILED_EVENT).with_field("dispatch_error", reason.clone())];
                vec![TxStatusUpdate::Pool, TxStatusUpdate::InBlock { block: in_block }, TxStatusUpdate::Finalized { block: in_block, events }]
            }
            SimulatedOutcome::Stall => vec![TxStatusUpdate::Pool],
            SimulatedOutcome::LateFinalize => {
                Self::execute(&mut chain, &unsigned.call);
                vec![TxStatusUpdate::Pool]
            }
            SimulatedOutcome::EndStream => vec![TxStatusUpdate::Pool, TxStatusUpdate::InBlock { block: in_block }],
        };
        if matches!(outcome, SimulatedOutcome::Stall | SimulatedOutcome::LateFinalize) {
            chain.stalled.insert(tx_hash);
        } else {
            chain.stalled.remove(&tx_hash);
        }
        chain.submissions.insert(tx_hash, updates);
        info!(
            "simulated ledger accepted transaction tx_hash={:#x} event_id={} recipient={} outcome={:?}",
            tx_hash, unsigned.call.event_id, unsigned.call.recipient, outcome
        );
        Ok(tx_hash)
    }

    async fn subscribe_status(&self, tx_hash: &TxHash) -> Result<TxStatusStream, PipelineError> {
        self.latency().await;
        let (updates, stalled) = {
            let mut chain = self.chain.lock();
            if chain.failing_subscriptions > 0 {
                chain.failing_subscriptions -= 1;
                return Err(PipelineError::NetworkError("simulated: status feed unavailable".to_string()));
            }
            let updates = chain
                .submissions
                .get(tx_hash)
                .cloned()
                .ok_or_else(|| PipelineError::ledger("subscribe_status", format!("unknown transaction {:#x}", tx_hash)))?;
            (updates, chain.stalled.contains(tx_hash))
        };
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        debug!("simulated subscription opened tx_hash={:#x} updates={} stalled={}", tx_hash, updates.len(), stalled);

        let step_delay = *self.step_delay.lock();
        let guard = SubscriptionGuard::new(self.active_subscriptions.clone());
        let replay = stream::iter(updates).then(move |update| async move {
            if !step_delay.is_zero() {
                tokio::time::sleep(step_delay).await;
            }
            Ok(update)
        });
        let replay = if stalled { replay.chain(stream::pending()).boxed() } else { replay.boxed() };
        Ok(replay
            .map(move |item| {
                guard.hold();
                item
            })
            .boxed())
    }

    async fn has_attended(&self, event_id: &EventId, wallet: &WalletAddress) -> Result<bool, PipelineError> {
        self.attendance_calls.fetch_add(1, Ordering::SeqCst);
        self.latency().await;
        let mut chain = self.chain.lock();
        if chain.failing_attendance_queries > 0 {
            chain.failing_attendance_queries -= 1;
            return Err(PipelineError::NetworkError("simulated: connection refused".to_string()));
        }
        if chain.rejected_attendance_queries > 0 {
            chain.rejected_attendance_queries -= 1;
            return Err(PipelineError::ledger("has_attended", "simulated: contract query trapped"));
        }
        Ok(chain.attended.contains(&(event_id.clone(), wallet.clone())))
    }
}
