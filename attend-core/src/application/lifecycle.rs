use crate::domain::{CheckIn, FinalityOutcome, FinalityVerdict, JobError, MintJob, MintStatus, NftRecord};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Outside observers of the pipeline (metrics, audit). Every hook defaults to a no-op.
pub trait MintObserver: Send + Sync {
    fn on_checkin_recorded(&self, _check_in: &CheckIn, _duplicate: bool) {}
    fn on_job_created(&self, _job: &MintJob) {}
    fn on_status_changed(&self, _job: &MintJob, _from: MintStatus, _to: MintStatus) {}
    fn on_confirmation(&self, _job: &MintJob, _outcome: &FinalityOutcome) {}
    fn on_completed(&self, _job: &MintJob, _record: &NftRecord) {}
    /// Called for every entry into FAILED; `job.retry_exhausted` tells whether it is permanent.
    fn on_failed(&self, _job: &MintJob, _error: &JobError) {}
}

/// Short label for a confirmation outcome: `success`, `revert` or `timeout`.
pub fn confirmation_label(outcome: &FinalityOutcome) -> &'static str {
    match outcome {
        FinalityOutcome::Finalized { verdict: FinalityVerdict::Success { .. }, .. } => "success",
        FinalityOutcome::Finalized { verdict: FinalityVerdict::Reverted { .. }, .. } => "revert",
        FinalityOutcome::TimedOut { .. } => "timeout",
    }
}

pub struct NoopObserver;

impl MintObserver for NoopObserver {}

#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn MintObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn MintObserver>) {
        self.observers.push(observer);
    }
}

impl MintObserver for CompositeObserver {
    fn on_checkin_recorded(&self, check_in: &CheckIn, duplicate: bool) {
        trace!("on_checkin_recorded dispatch observer_count={} check_in_id={}", self.observers.len(), check_in.check_in_id);
        for observer in &self.observers {
            observer.on_checkin_recorded(check_in, duplicate);
        }
    }

    fn on_job_created(&self, job: &MintJob) {
        trace!("on_job_created dispatch observer_count={} job_id={}", self.observers.len(), job.job_id);
        for observer in &self.observers {
            observer.on_job_created(job);
        }
    }

    fn on_status_changed(&self, job: &MintJob, from: MintStatus, to: MintStatus) {
        for observer in &self.observers {
            observer.on_status_changed(job, from, to);
        }
    }

    fn on_confirmation(&self, job: &MintJob, outcome: &FinalityOutcome) {
        for observer in &self.observers {
            observer.on_confirmation(job, outcome);
        }
    }

    fn on_completed(&self, job: &MintJob, record: &NftRecord) {
        for observer in &self.observers {
            observer.on_completed(job, record);
        }
    }

    fn on_failed(&self, job: &MintJob, error: &JobError) {
        for observer in &self.observers {
            observer.on_failed(job, error);
        }
    }
}

/// Writes an `audit:` log line for the facts operators reconcile against the ledger.
pub struct AuditLoggingObserver;

impl MintObserver for AuditLoggingObserver {
    fn on_checkin_recorded(&self, check_in: &CheckIn, duplicate: bool) {
        debug!(
            "audit: check-in recorded check_in_id={} event_id={} duplicate={} has_wallet={}",
            check_in.check_in_id,
            check_in.event_id,
            duplicate,
            check_in.wallet_address.is_some()
        );
    }

    fn on_job_created(&self, job: &MintJob) {
        info!(
            "audit: mint job created job_id={:#x} event_id={} wallet={} status={} check_in_id={}",
            job.job_id, job.event_id, job.wallet_address, job.status, job.check_in_id
        );
    }

    fn on_completed(&self, job: &MintJob, record: &NftRecord) {
        info!(
            "audit: token minted job_id={:#x} event_id={} owner={} token_id={} tx_hash={:#x} block={} block_hash={:#x} attempt={}",
            job.job_id,
            record.event_id,
            record.owner_wallet,
            record.contract_token_id,
            record.transaction_hash,
            record.minted_at_block.number,
            record.minted_at_block.hash,
            job.attempt
        );
    }

    fn on_failed(&self, job: &MintJob, error: &JobError) {
        if job.retry_exhausted {
            warn!(
                "audit: mint permanently failed job_id={:#x} event_id={} wallet={} attempts={} kind={} error={}",
                job.job_id, job.event_id, job.wallet_address, job.attempt, error.kind, error.message
            );
        }
    }
}
