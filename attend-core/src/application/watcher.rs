use crate::domain::{inspect_finalized_events, FinalityOutcome, Milestone, TxStatusUpdate};
use crate::foundation::TxHash;
use crate::infrastructure::ledger::LedgerClient;
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

const SUBSCRIBE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Resolves a submitted transaction to finalized-success, finalized-revert or timeout.
#[derive(Clone)]
pub struct ConfirmationWatcher {
    ledger: Arc<dyn LedgerClient>,
}

impl ConfirmationWatcher {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Returns within `timeout` (plus scheduling slack) whatever the subscription does.
    ///
    /// Only `Finalized` ends the wait; inclusion in a block can still be reorganized away. The
    /// deadline and the stream race in one `select!`, so exactly one of them resolves the wait,
    /// and the subscription is dropped on every return path. A failed subscribe is retried until
    /// the deadline.
    pub async fn await_finality(&self, tx_hash: &TxHash, timeout: Duration) -> FinalityOutcome {
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut subscribe_failures = 0u32;
        let mut stream = loop {
            tokio::select! {
                _ = &mut deadline => {
                    warn!(
                        "confirmation timed out before a status subscription was established tx_hash={:#x} timeout_ms={} subscribe_failures={}",
                        tx_hash, timeout.as_millis(), subscribe_failures
                    );
                    return FinalityOutcome::TimedOut { last_milestone: None };
                }
                subscribed = self.ledger.subscribe_status(tx_hash) => match subscribed {
                    Ok(stream) => break stream,
                    Err(err) => {
                        subscribe_failures += 1;
                        warn!("status subscription failed, retrying tx_hash={:#x} failures={} error={}", tx_hash, subscribe_failures, err);
                    }
                },
            }
            let retry_at = (tokio::time::Instant::now() + SUBSCRIBE_RETRY_DELAY).min(deadline.deadline());
            tokio::time::sleep_until(retry_at).await;
        };

        let mut last_milestone: Option<Milestone> = None;
        loop {
            tokio::select! {
                _ = &mut deadline => {
                    warn!(
                        "confirmation timed out tx_hash={:#x} timeout_ms={} last_milestone={:?}",
                        tx_hash, timeout.as_millis(), last_milestone
                    );
                    return FinalityOutcome::TimedOut { last_milestone };
                }
                next = stream.next() => match next {
                    Some(Ok(TxStatusUpdate::Finalized { block, events })) => {
                        let verdict = inspect_finalized_events(&events);
                        info!("transaction finalized tx_hash={:#x} block={} verdict={:?}", tx_hash, block.number, verdict);
                        return FinalityOutcome::Finalized { block, verdict };
                    }
                    Some(Ok(update)) => {
                        debug!("transaction milestone tx_hash={:#x} milestone={:?}", tx_hash, update.milestone());
                        last_milestone = Some(update.milestone());
                    }
                    Some(Err(err)) => {
                        warn!("status stream error tx_hash={:#x} error={}", tx_hash, err);
                    }
                    None => {
                        warn!("status stream ended before finality tx_hash={:#x} last_milestone={:?}", tx_hash, last_milestone);
                        return FinalityOutcome::TimedOut { last_milestone };
                    }
                },
            }
        }
    }
}
