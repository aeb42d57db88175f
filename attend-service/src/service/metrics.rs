use attend_core::application::{confirmation_label, MintObserver};
use attend_core::domain::{CheckIn, FinalityOutcome, JobError, MintJob, MintStatus, NftRecord, QueueStats};
use attend_core::foundation::PipelineError;
use log::debug;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub checkins_recorded: u64,
    pub checkins_duplicate: u64,
    pub checkins_rejected: u64,
    pub jobs_created: u64,
    pub mints_completed: u64,
    pub mint_failures: u64,
    pub permanent_failures: u64,
    pub confirmations_success: u64,
    pub confirmations_revert: u64,
    pub confirmations_timeout: u64,
    /// Jobs in CHECKING_DEDUP, SUBMITTING or AWAITING_CONFIRMATION at the last store refresh.
    pub jobs_in_flight: i64,
}

pub struct Metrics {
    registry: Registry,
    checkins_total: IntCounterVec,
    jobs_created_total: IntCounter,
    transitions_total: IntCounterVec,
    mints_completed_total: IntCounter,
    mint_failures_total: IntCounterVec,
    confirmation_outcomes_total: IntCounterVec,
    jobs_by_status: IntGaugeVec,
    started_at: Instant,
    checkins_recorded: AtomicU64,
    checkins_duplicate: AtomicU64,
    checkins_rejected: AtomicU64,
    jobs_created: AtomicU64,
    mints_completed: AtomicU64,
    mint_failures: AtomicU64,
    permanent_failures: AtomicU64,
    confirmations_success: AtomicU64,
    confirmations_revert: AtomicU64,
    confirmations_timeout: AtomicU64,
    jobs_in_flight: AtomicI64,
}

fn metrics_err(operation: &str) -> impl Fn(prometheus::Error) -> PipelineError + '_ {
    move |err| PipelineError::MetricsError { operation: operation.to_string(), details: err.to_string() }
}

impl Metrics {
    pub fn new() -> Result<Self, PipelineError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let checkins_total = IntCounterVec::new(Opts::new("attend_checkins_total", "Check-in notifications by result"), &["result"])
            .map_err(metrics_err("checkins_total"))?;
        let jobs_created_total =
            IntCounter::new("attend_jobs_created_total", "Mint jobs created").map_err(metrics_err("jobs_created_total"))?;
        let transitions_total =
            IntCounterVec::new(Opts::new("attend_transitions_total", "Mint job status transitions by target status"), &["to"])
                .map_err(metrics_err("transitions_total"))?;
        let mints_completed_total = IntCounter::new("attend_mints_completed_total", "Attendance tokens minted and finalized")
            .map_err(metrics_err("mints_completed_total"))?;
        let mint_failures_total = IntCounterVec::new(
            Opts::new("attend_mint_failures_total", "Entries into FAILED by error kind and permanence"),
            &["kind", "permanent"],
        )
        .map_err(metrics_err("mint_failures_total"))?;
        let confirmation_outcomes_total =
            IntCounterVec::new(Opts::new("attend_confirmation_outcomes_total", "Confirmation waits by outcome"), &["outcome"])
                .map_err(metrics_err("confirmation_outcomes_total"))?;
        let jobs_by_status = IntGaugeVec::new(Opts::new("attend_jobs", "Stored mint jobs by status"), &["status"])
            .map_err(metrics_err("jobs_by_status"))?;

        registry.register(Box::new(checkins_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(jobs_created_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(transitions_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(mints_completed_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(mint_failures_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(confirmation_outcomes_total.clone())).map_err(metrics_err("register"))?;
        registry.register(Box::new(jobs_by_status.clone())).map_err(metrics_err("register"))?;

        let out = Self {
            registry,
            checkins_total,
            jobs_created_total,
            transitions_total,
            mints_completed_total,
            mint_failures_total,
            confirmation_outcomes_total,
            jobs_by_status,
            started_at: Instant::now(),
            checkins_recorded: AtomicU64::new(0),
            checkins_duplicate: AtomicU64::new(0),
            checkins_rejected: AtomicU64::new(0),
            jobs_created: AtomicU64::new(0),
            mints_completed: AtomicU64::new(0),
            mint_failures: AtomicU64::new(0),
            permanent_failures: AtomicU64::new(0),
            confirmations_success: AtomicU64::new(0),
            confirmations_revert: AtomicU64::new(0),
            confirmations_timeout: AtomicU64::new(0),
            jobs_in_flight: AtomicI64::new(0),
        };
        debug!("prometheus metrics registered metric_count=7");
        Ok(out)
    }

    /// Check-ins refused before reaching the store (malformed payload or missing fields).
    pub fn inc_checkin_rejected(&self) {
        self.checkins_total.with_label_values(&["rejected"]).inc();
        self.checkins_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Refreshes the per-status gauges from a store scan.
    pub fn set_job_counts(&self, stats: &QueueStats) {
        let mut in_flight = 0i64;
        for (status, count) in &stats.by_status {
            let count = i64::try_from(*count).unwrap_or(i64::MAX);
            self.jobs_by_status.with_label_values(&[status.as_str()]).set(count);
            if status.is_in_flight() {
                in_flight = in_flight.saturating_add(count);
            }
        }
        self.jobs_in_flight.store(in_flight, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            checkins_recorded: self.checkins_recorded.load(Ordering::Relaxed),
            checkins_duplicate: self.checkins_duplicate.load(Ordering::Relaxed),
            checkins_rejected: self.checkins_rejected.load(Ordering::Relaxed),
            jobs_created: self.jobs_created.load(Ordering::Relaxed),
            mints_completed: self.mints_completed.load(Ordering::Relaxed),
            mint_failures: self.mint_failures.load(Ordering::Relaxed),
            permanent_failures: self.permanent_failures.load(Ordering::Relaxed),
            confirmations_success: self.confirmations_success.load(Ordering::Relaxed),
            confirmations_revert: self.confirmations_revert.load(Ordering::Relaxed),
            confirmations_timeout: self.confirmations_timeout.load(Ordering::Relaxed),
            jobs_in_flight: self.jobs_in_flight.load(Ordering::Relaxed),
        }
    }

    pub fn encode(&self) -> Result<String, PipelineError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(metrics_err("encode"))?;
        String::from_utf8(buffer)
            .map_err(|err| PipelineError::MetricsError { operation: "encode".to_string(), details: err.to_string() })
    }
}

impl MintObserver for Metrics {
    fn on_checkin_recorded(&self, _check_in: &CheckIn, duplicate: bool) {
        if duplicate {
            self.checkins_total.with_label_values(&["duplicate"]).inc();
            self.checkins_duplicate.fetch_add(1, Ordering::Relaxed);
        } else {
            self.checkins_total.with_label_values(&["recorded"]).inc();
            self.checkins_recorded.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn on_job_created(&self, _job: &MintJob) {
        self.jobs_created_total.inc();
        self.jobs_created.fetch_add(1, Ordering::Relaxed);
    }

    fn on_status_changed(&self, _job: &MintJob, _from: MintStatus, to: MintStatus) {
        self.transitions_total.with_label_values(&[to.as_str()]).inc();
    }

    fn on_confirmation(&self, _job: &MintJob, outcome: &FinalityOutcome) {
        let label = confirmation_label(outcome);
        self.confirmation_outcomes_total.with_label_values(&[label]).inc();
        match label {
            "success" => {
                self.confirmations_success.fetch_add(1, Ordering::Relaxed);
            }
            "revert" => {
                self.confirmations_revert.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.confirmations_timeout.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn on_completed(&self, _job: &MintJob, _record: &NftRecord) {
        self.mints_completed_total.inc();
        self.mints_completed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_failed(&self, job: &MintJob, error: &JobError) {
        let permanent = if job.retry_exhausted { "true" } else { "false" };
        self.mint_failures_total.with_label_values(&[error.kind.as_str(), permanent]).inc();
        self.mint_failures.fetch_add(1, Ordering::Relaxed);
        if job.retry_exhausted {
            self.permanent_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}
