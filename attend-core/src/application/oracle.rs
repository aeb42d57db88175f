use crate::foundation::{EventId, PipelineError, WalletAddress};
use crate::infrastructure::ledger::LedgerClient;
use log::debug;
use std::sync::Arc;

/// Read-only "was a token already issued for (event, wallet)?" query.
///
/// Never cached: a previous attempt's transaction may finalize between retries.
#[derive(Clone)]
pub struct AttendanceDedupOracle {
    ledger: Arc<dyn LedgerClient>,
}

impl AttendanceDedupOracle {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    pub async fn has_minted(&self, event_id: &EventId, wallet: &WalletAddress) -> Result<bool, PipelineError> {
        let attended = self.ledger.has_attended(event_id, wallet).await?;
        debug!("attendance query event_id={} wallet={} attended={}", event_id, wallet, attended);
        Ok(attended)
    }
}
