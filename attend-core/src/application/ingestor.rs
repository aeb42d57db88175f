use super::coordinator::MintCoordinator;
use super::lifecycle::MintObserver;
use super::queue::ReadyQueue;
use crate::domain::{classify_wallet, CheckIn, CheckInWire, MintStatus};
use crate::foundation::{now_nanos, CheckInId, EventId, JobId, PipelineError};
use crate::infrastructure::storage::StatusStore;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Enqueued { job_id: JobId, status: MintStatus, created: bool },
    Deduplicated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchItemOutcome {
    Queued { check_in_id: String, job_id: JobId, status: MintStatus },
    Duplicate { check_in_id: String },
    Error { check_in_id: String, error: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BulkMintReport {
    pub total: usize,
    pub queued: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Entry point for check-in notifications. Delivery is at-least-once; the check-in id is the
/// idempotency key.
pub struct CheckInIngestor {
    store: Arc<dyn StatusStore>,
    coordinator: Arc<MintCoordinator>,
    queue: ReadyQueue,
    observer: Arc<dyn MintObserver>,
}

impl CheckInIngestor {
    pub fn new(store: Arc<dyn StatusStore>, coordinator: Arc<MintCoordinator>, queue: ReadyQueue, observer: Arc<dyn MintObserver>) -> Self {
        Self { store, coordinator, queue, observer }
    }

    pub fn ingest_wire(&self, wire: CheckInWire) -> Result<IngestOutcome, PipelineError> {
        let check_in = CheckIn::from_wire(wire, now_nanos())?;
        self.ingest(check_in)
    }

    pub fn ingest(&self, check_in: CheckIn) -> Result<IngestOutcome, PipelineError> {
        let inserted = self.store.insert_checkin_if_absent(&check_in)?;
        self.observer.on_checkin_recorded(&check_in, !inserted);
        if !inserted {
            info!("duplicate check-in ignored check_in_id={} event_id={}", check_in.check_in_id, check_in.event_id);
            self.repair_missing_job(&check_in.check_in_id)?;
            return Ok(IngestOutcome::Deduplicated);
        }

        let (job, created) = self.coordinator.ensure_job(&check_in)?;
        if !job.is_terminal() {
            self.queue.push(job.job_id);
        }
        info!(
            "check-in ingested check_in_id={} event_id={} job_id={:#x} status={} new_job={}",
            check_in.check_in_id, check_in.event_id, job.job_id, job.status, created
        );
        Ok(IngestOutcome::Enqueued { job_id: job.job_id, status: job.status, created })
    }

    /// A redelivery of a recorded check-in whose job was never written (crash between the two
    /// writes) creates the job from the originally recorded check-in.
    fn repair_missing_job(&self, check_in_id: &CheckInId) -> Result<(), PipelineError> {
        let Some(recorded) = self.store.get_checkin(check_in_id)? else {
            return Ok(());
        };
        let (job, created) = self.coordinator.ensure_job(&recorded)?;
        if created {
            warn!("created missing job for recorded check-in check_in_id={} job_id={:#x}", check_in_id, job.job_id);
            if !job.is_terminal() {
                self.queue.push(job.job_id);
            }
        }
        Ok(())
    }

    /// Ingests each item independently; one bad item does not reject the batch.
    pub fn ingest_batch(&self, wires: Vec<CheckInWire>) -> Vec<BatchItemOutcome> {
        wires
            .into_iter()
            .map(|wire| {
                let check_in_id = wire.check_in_id.trim().to_string();
                match self.ingest_wire(wire) {
                    Ok(IngestOutcome::Enqueued { job_id, status, .. }) => BatchItemOutcome::Queued { check_in_id, job_id, status },
                    Ok(IngestOutcome::Deduplicated) => BatchItemOutcome::Duplicate { check_in_id },
                    Err(err) => {
                        warn!("batch check-in rejected check_in_id={} error={}", check_in_id, err);
                        BatchItemOutcome::Error { check_in_id, error: err.to_string() }
                    }
                }
            })
            .collect()
    }

    /// Re-enqueues every with-wallet check-in of the event whose job can still progress.
    ///
    /// Completed, skipped and permanently failed jobs count as duplicates, as do further
    /// check-ins that map onto a job already counted.
    pub fn bulk_mint(&self, event_id: &EventId) -> Result<BulkMintReport, PipelineError> {
        let check_ins = self.store.list_checkins_by_event(event_id)?;
        let mut report = BulkMintReport::default();
        let mut seen = HashSet::new();

        for check_in in check_ins.iter().filter(|c| classify_wallet(c.wallet_address.as_deref()).is_valid()) {
            report.total += 1;
            let job = match self.coordinator.ensure_job(check_in) {
                Ok((job, _)) => job,
                Err(err) => {
                    warn!("bulk mint could not prepare job check_in_id={} error={}", check_in.check_in_id, err);
                    report.errors += 1;
                    continue;
                }
            };
            if !seen.insert(job.job_id) || job.is_terminal() {
                report.duplicates += 1;
                continue;
            }
            self.queue.push(job.job_id);
            report.queued += 1;
        }

        info!(
            "bulk mint requested event_id={} total={} queued={} duplicates={} errors={}",
            event_id, report.total, report.queued, report.duplicates, report.errors
        );
        Ok(report)
    }
}
