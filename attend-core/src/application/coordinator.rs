//! Mint job state machine driver.
//!
//! The coordinator is the only writer of job state. Every pass over a job runs under that
//! job's lock, re-reads the stored job, and persists each transition before acting on it, so a
//! crash leaves the last durable state behind for recovery.

use super::job_lock::JobLocks;
use super::lifecycle::MintObserver;
use super::oracle::AttendanceDedupOracle;
use super::submitter::TransactionSubmitter;
use super::watcher::ConfirmationWatcher;
use crate::domain::job::{apply_transition, ensure_operator_reset, exponential_delay_ms};
use crate::domain::{
    classify_wallet, derive_job_id, BlockRef, CheckIn, FinalityOutcome, FinalityVerdict, JobErrorKind, MetadataTemplate, MintJob,
    MintMetadata, MintStatus, NftRecord, SkipReason, WalletCheck,
};
use crate::foundation::{now_nanos, JobId, PipelineError, TxHash, WalletAddress, NANOS_PER_MILLI};
use crate::infrastructure::config::PipelineConfig;
use crate::infrastructure::storage::StatusStore;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub confirmation_timeout: Duration,
    /// Jobs allowed inside the dedup check and submission at once.
    pub ledger_concurrency: usize,
}

impl From<&PipelineConfig> for CoordinatorConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_base_delay_ms: config.retry_base_delay_ms,
            retry_max_delay_ms: config.retry_max_delay_ms,
            confirmation_timeout: config.confirmation_timeout(),
            ledger_concurrency: config.worker_concurrency,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Result of one `process` pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Another execution holds the job; nothing was done.
    Deferred,
    /// The job had nothing to do now (terminal, or waiting for its retry time).
    Idle(MintStatus),
    /// The pass ended at this status.
    Checkpoint(MintStatus),
}

pub struct MintCoordinator {
    store: Arc<dyn StatusStore>,
    oracle: AttendanceDedupOracle,
    submitter: TransactionSubmitter,
    watcher: ConfirmationWatcher,
    observer: Arc<dyn MintObserver>,
    locks: JobLocks,
    permits: Semaphore,
    config: CoordinatorConfig,
    metadata: MetadataTemplate,
}

impl MintCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn StatusStore>,
        oracle: AttendanceDedupOracle,
        submitter: TransactionSubmitter,
        watcher: ConfirmationWatcher,
        observer: Arc<dyn MintObserver>,
        config: CoordinatorConfig,
        metadata: MetadataTemplate,
    ) -> Self {
        let permits = Semaphore::new(config.ledger_concurrency.max(1));
        Self { store, oracle, submitter, watcher, observer, locks: JobLocks::new(), permits, config, metadata }
    }

    pub fn store(&self) -> &Arc<dyn StatusStore> {
        &self.store
    }

    pub fn locks(&self) -> &JobLocks {
        &self.locks
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Returns the job for the check-in's (event, wallet) pair, creating it on first sight.
    ///
    /// An existing job is returned untouched whatever its state. A missing or malformed wallet
    /// yields a job that starts in SKIPPED with `NoWallet`.
    pub fn ensure_job(&self, check_in: &CheckIn) -> Result<(MintJob, bool), PipelineError> {
        let check = classify_wallet(check_in.wallet_address.as_deref());
        let job_id = derive_job_id(&check_in.event_id, check.key_form());
        let now = now_nanos();
        let wallet = match &check {
            WalletCheck::Valid(address) => address.clone(),
            other => WalletAddress::new(other.key_form()),
        };
        let metadata = MintMetadata::from_check_in(check_in, &self.metadata);
        let mut job = MintJob::new(job_id, check_in.event_id.clone(), wallet, check_in.check_in_id.clone(), metadata, now);
        match &check {
            WalletCheck::Valid(_) => {}
            WalletCheck::Missing => job = job.skipped(SkipReason::NoWallet, "check-in has no wallet address", now),
            WalletCheck::Malformed(raw) => {
                job = job.skipped(SkipReason::NoWallet, format!("malformed wallet address: {}", raw), now)
            }
        }

        let (stored, created) = self.store.create_job_if_absent(job)?;
        if created {
            self.observer.on_job_created(&stored);
        } else {
            debug!(
                "check-in maps to existing job job_id={:#x} check_in_id={} status={}",
                stored.job_id, check_in.check_in_id, stored.status
            );
        }
        Ok((stored, created))
    }

    /// Runs the job to its next checkpoint.
    pub async fn process(&self, job_id: &JobId) -> Result<ProcessOutcome, PipelineError> {
        let Some(_guard) = self.locks.try_acquire(job_id) else {
            debug!("job already executing, deferring job_id={:#x}", job_id);
            return Ok(ProcessOutcome::Deferred);
        };
        let mut job = self.store.get(job_id)?.ok_or_else(|| PipelineError::job_not_found(format!("{:#x}", job_id)))?;
        if job.is_terminal() {
            return Ok(ProcessOutcome::Idle(job.status));
        }

        match job.status {
            MintStatus::Pending | MintStatus::Failed => {
                if !job.is_ready(now_nanos()) {
                    return Ok(ProcessOutcome::Idle(job.status));
                }
                job.not_before_nanos = 0;
                self.advance(&mut job, MintStatus::CheckingDedup)?;
                self.run_from_dedup(job).await
            }
            MintStatus::CheckingDedup => {
                if !job.is_ready(now_nanos()) {
                    return Ok(ProcessOutcome::Idle(job.status));
                }
                self.run_from_dedup(job).await
            }
            MintStatus::Submitting => {
                // Unlocked SUBMITTING means the previous process died between signing and
                // learning the result; the dedup check on retry covers a transaction that landed.
                warn!("found interrupted submission job_id={:#x} event_id={} attempt={}", job.job_id, job.event_id, job.attempt);
                self.fail(job, JobErrorKind::Interrupted, "process stopped during submission".to_string())
            }
            MintStatus::AwaitingConfirmation => match job.transaction_hash {
                Some(tx_hash) => {
                    info!("resuming confirmation wait job_id={:#x} tx_hash={:#x}", job.job_id, tx_hash);
                    self.confirm(job, tx_hash).await
                }
                None => self.fail(job, JobErrorKind::Interrupted, "awaiting confirmation without a transaction hash".to_string()),
            },
            MintStatus::Completed | MintStatus::Skipped => Ok(ProcessOutcome::Idle(job.status)),
        }
    }

    async fn run_from_dedup(&self, mut job: MintJob) -> Result<ProcessOutcome, PipelineError> {
        if !classify_wallet(Some(job.wallet_address.as_str())).is_valid() {
            let message = format!("malformed wallet address: {}", job.wallet_address);
            return self.skip(job, SkipReason::NoWallet, message);
        }

        let permit = self.permits.acquire().await.map_err(|err| PipelineError::Message(format!("ledger permits closed: {}", err)))?;

        match self.oracle.has_minted(&job.event_id, &job.wallet_address).await {
            Ok(true) => {
                drop(permit);
                return self.skip(job, SkipReason::AlreadyAttended, "ledger reports a token already issued for this wallet and event".to_string());
            }
            Ok(false) => {}
            Err(err) => {
                drop(permit);
                return self.attendance_query_failed(job, err);
            }
        }

        job.dedup_query_failures = 0;
        self.advance(&mut job, MintStatus::Submitting)?;
        let submitted = self.submitter.submit(&job).await;
        drop(permit);

        let tx_hash = match submitted {
            Ok(tx_hash) => tx_hash,
            Err(err) => {
                warn!("mint submission failed job_id={:#x} kind={} error={}", job.job_id, err.kind(), err);
                return self.fail(job, err.kind(), err.to_string());
            }
        };

        job.transaction_hash = Some(tx_hash);
        job.block_reference = None;
        self.advance(&mut job, MintStatus::AwaitingConfirmation)?;
        self.confirm(job, tx_hash).await
    }

    async fn confirm(&self, job: MintJob, tx_hash: TxHash) -> Result<ProcessOutcome, PipelineError> {
        let outcome = self.watcher.await_finality(&tx_hash, self.config.confirmation_timeout).await;
        self.observer.on_confirmation(&job, &outcome);
        match outcome {
            FinalityOutcome::Finalized { block, verdict: FinalityVerdict::Success { token_id } } => {
                self.complete(job, tx_hash, block, token_id)
            }
            FinalityOutcome::Finalized { block, verdict: FinalityVerdict::Reverted { reason } } => {
                let mut job = job;
                job.block_reference = Some(block);
                self.fail(job, JobErrorKind::LedgerRevert, format!("transaction {:#x} reverted: {}", tx_hash, reason))
            }
            FinalityOutcome::TimedOut { last_milestone } => self.fail(
                job,
                JobErrorKind::ConfirmationTimeout,
                format!(
                    "no finality for {:#x} within {}s (last milestone: {:?})",
                    tx_hash,
                    self.config.confirmation_timeout.as_secs(),
                    last_milestone
                ),
            ),
        }
    }

    fn complete(&self, job: MintJob, tx_hash: TxHash, block: BlockRef, token_id: u64) -> Result<ProcessOutcome, PipelineError> {
        let now = now_nanos();
        let from = job.status;
        let mut completed = job;
        apply_transition(&mut completed, MintStatus::Completed, now)?;
        completed.block_reference = Some(block);
        completed.not_before_nanos = 0;

        let record = NftRecord {
            contract_token_id: token_id,
            job_id: completed.job_id,
            event_id: completed.event_id.clone(),
            owner_wallet: completed.wallet_address.clone(),
            metadata_snapshot: completed.metadata.clone(),
            transaction_hash: tx_hash,
            minted_at_block: block,
            recorded_at_nanos: now,
        };
        self.store.complete_job(&completed, &record)?;
        self.observer.on_status_changed(&completed, from, MintStatus::Completed);
        self.observer.on_completed(&completed, &record);
        Ok(ProcessOutcome::Checkpoint(MintStatus::Completed))
    }

    fn skip(&self, mut job: MintJob, reason: SkipReason, message: String) -> Result<ProcessOutcome, PipelineError> {
        let now = now_nanos();
        let from = job.status;
        apply_transition(&mut job, MintStatus::Skipped, now)?;
        job.skip_reason = Some(reason);
        job.record_error(reason.error_kind(), message, now);
        job.not_before_nanos = 0;
        self.store.upsert(&job)?;
        info!("mint job skipped job_id={:#x} event_id={} wallet={} reason={:?}", job.job_id, job.event_id, job.wallet_address, reason);
        self.observer.on_status_changed(&job, from, MintStatus::Skipped);
        Ok(ProcessOutcome::Checkpoint(MintStatus::Skipped))
    }

    /// Transport failures keep the job in CHECKING_DEDUP with exponential backoff until they
    /// reach `max_attempts`, then fail the attempt. Definitive errors fail the attempt at once.
    fn attendance_query_failed(&self, mut job: MintJob, err: PipelineError) -> Result<ProcessOutcome, PipelineError> {
        if !err.is_transient() {
            warn!("attendance query rejected job_id={:#x} event_id={} attempt={} error={}", job.job_id, job.event_id, job.attempt, err);
            return self.fail(job, JobErrorKind::AttendanceQueryFailed, err.to_string());
        }

        job.dedup_query_failures = job.dedup_query_failures.saturating_add(1);
        if job.dedup_query_failures >= self.config.max_attempts {
            warn!(
                "attendance query kept failing, failing attempt job_id={:#x} event_id={} attempt={} query_failures={} error={}",
                job.job_id, job.event_id, job.attempt, job.dedup_query_failures, err
            );
            let message = format!("attendance query failed {} times: {}", job.dedup_query_failures, err);
            return self.fail(job, JobErrorKind::NetworkError, message);
        }

        let now = now_nanos();
        let delay_ms = exponential_delay_ms(job.dedup_query_failures, self.config.retry_base_delay_ms, self.config.retry_max_delay_ms);
        job.record_error(JobErrorKind::NetworkError, err.to_string(), now);
        job.not_before_nanos = now.saturating_add(delay_ms.saturating_mul(NANOS_PER_MILLI));
        job.updated_at_nanos = now;
        self.store.upsert(&job)?;
        warn!(
            "attendance query failed, deferring dedup check job_id={:#x} event_id={} query_failures={} retry_in_ms={} error={}",
            job.job_id, job.event_id, job.dedup_query_failures, delay_ms, err
        );
        Ok(ProcessOutcome::Checkpoint(MintStatus::CheckingDedup))
    }

    /// Moves the job to FAILED, scheduling the next attempt or marking the failure permanent.
    fn fail(&self, mut job: MintJob, kind: JobErrorKind, message: String) -> Result<ProcessOutcome, PipelineError> {
        let now = now_nanos();
        let from = job.status;
        apply_transition(&mut job, MintStatus::Failed, now)?;
        job.record_error(kind, message, now);
        job.retry_exhausted = !kind.is_retryable() || job.attempt >= self.config.max_attempts;
        job.not_before_nanos = if job.retry_exhausted {
            0
        } else {
            let delay_ms = exponential_delay_ms(job.attempt, self.config.retry_base_delay_ms, self.config.retry_max_delay_ms);
            now.saturating_add(delay_ms.saturating_mul(NANOS_PER_MILLI))
        };
        self.store.upsert(&job)?;

        if job.retry_exhausted {
            warn!(
                "mint job permanently failed job_id={:#x} event_id={} attempts={} kind={}",
                job.job_id, job.event_id, job.attempt, kind
            );
        } else {
            info!(
                "mint job failed, retry scheduled job_id={:#x} attempt={} max_attempts={} kind={} not_before_nanos={}",
                job.job_id, job.attempt, self.config.max_attempts, kind, job.not_before_nanos
            );
        }
        self.observer.on_status_changed(&job, from, MintStatus::Failed);
        if let Some(error) = &job.last_error {
            self.observer.on_failed(&job, error);
        }
        Ok(ProcessOutcome::Checkpoint(MintStatus::Failed))
    }

    fn advance(&self, job: &mut MintJob, to: MintStatus) -> Result<(), PipelineError> {
        let from = job.status;
        apply_transition(job, to, now_nanos())?;
        self.store.upsert(job)?;
        if from != to {
            self.observer.on_status_changed(job, from, to);
        }
        Ok(())
    }

    /// Operator action: returns a permanently FAILED job to PENDING with a fresh attempt budget.
    pub fn operator_retry(&self, job_id: &JobId) -> Result<MintJob, PipelineError> {
        let Some(_guard) = self.locks.try_acquire(job_id) else {
            return Err(PipelineError::JobBusy { job_id: format!("{:#x}", job_id) });
        };
        let mut job = self.store.get(job_id)?.ok_or_else(|| PipelineError::job_not_found(format!("{:#x}", job_id)))?;
        ensure_operator_reset(&job)?;

        let from = job.status;
        job.status = MintStatus::Pending;
        job.attempt = 0;
        job.retry_exhausted = false;
        job.not_before_nanos = 0;
        job.updated_at_nanos = now_nanos();
        self.store.upsert(&job)?;
        info!(
            "operator retry accepted job_id={:#x} event_id={} last_error={:?}",
            job.job_id,
            job.event_id,
            job.last_error.as_ref().map(|e| e.kind)
        );
        self.observer.on_status_changed(&job, from, MintStatus::Pending);
        Ok(job)
    }

    /// Non-terminal jobs whose retry time has passed and that no execution currently holds.
    pub fn due_jobs(&self, now: u64) -> Result<Vec<JobId>, PipelineError> {
        Ok(self
            .store
            .list_active()?
            .into_iter()
            .filter(|job| job.is_ready(now) && !self.locks.is_locked(&job.job_id))
            .map(|job| job.job_id)
            .collect())
    }

    /// Jobs a previous process left mid-flight. `process` knows how to resume each of them.
    pub fn recovery_candidates(&self) -> Result<Vec<MintJob>, PipelineError> {
        let in_flight: Vec<MintJob> = self.store.list_active()?.into_iter().filter(|job| job.status.is_in_flight()).collect();
        for job in &in_flight {
            info!(
                "recovering in-flight job job_id={:#x} status={} attempt={} tx_hash={:?}",
                job.job_id,
                job.status,
                job.attempt,
                job.transaction_hash.map(|h| format!("{:#x}", h))
            );
        }
        Ok(in_flight)
    }
}
