use crate::domain::{JobErrorKind, MintCall, MintJob, UnsignedTransaction};
use crate::foundation::{PipelineError, TxHash, WalletAddress};
use crate::infrastructure::ledger::LedgerClient;
use crate::infrastructure::signer::Signer;
use log::{debug, info};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("cost estimation failed: {0}")]
    GasEstimation(PipelineError),
    #[error("submission rejected: {0}")]
    Rejected(PipelineError),
}

impl SubmissionError {
    pub fn kind(&self) -> JobErrorKind {
        match self {
            SubmissionError::GasEstimation(_) => JobErrorKind::GasEstimationFailure,
            SubmissionError::Rejected(_) => JobErrorKind::SubmissionRejected,
        }
    }
}

/// Builds, signs and submits the mint call for a job snapshot. Writes nothing itself.
pub struct TransactionSubmitter {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn Signer>,
    contract: String,
    organizer: WalletAddress,
}

impl TransactionSubmitter {
    pub fn new(ledger: Arc<dyn LedgerClient>, signer: Arc<dyn Signer>, contract: impl Into<String>, organizer: WalletAddress) -> Self {
        Self { ledger, signer, contract: contract.into(), organizer }
    }

    /// The call is built from the metadata snapshot stored on the job, so a retry submits the same call.
    pub fn build_call(&self, job: &MintJob) -> Result<MintCall, PipelineError> {
        Ok(MintCall {
            contract: self.contract.clone(),
            event_id: job.event_id.clone(),
            recipient: job.wallet_address.clone(),
            metadata_json: job.metadata.to_call_json()?,
        })
    }

    pub async fn submit(&self, job: &MintJob) -> Result<TxHash, SubmissionError> {
        let call = self.build_call(job).map_err(SubmissionError::Rejected)?;
        let cost = self.ledger.estimate_cost(&call).await.map_err(SubmissionError::GasEstimation)?;
        debug!(
            "mint cost estimated job_id={:#x} gas_limit={} proof_size={} fee={}",
            job.job_id, cost.gas_limit, cost.proof_size, cost.fee
        );

        let unsigned = UnsignedTransaction { call, cost, signer: self.organizer.clone() };
        let signed = self.signer.sign(&unsigned, &self.organizer).await.map_err(SubmissionError::Rejected)?;
        let tx_hash = self.ledger.submit_signed(&signed).await.map_err(SubmissionError::Rejected)?;
        info!(
            "mint transaction submitted job_id={:#x} event_id={} recipient={} tx_hash={:#x} attempt={}",
            job.job_id, job.event_id, job.wallet_address, tx_hash, job.attempt
        );
        Ok(tx_hash)
    }
}
