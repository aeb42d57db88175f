use super::metrics::Metrics;
use super::shutdown::wait_for_shutdown;
use attend_core::domain::{MintJob, MintStatus, QueueStats};
use attend_core::foundation::{now_nanos, PipelineError, NANOS_PER_SECOND};
use attend_core::infrastructure::storage::StatusStore;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const MAX_JOBS_TO_LOG: usize = 50;

/// Periodically logs unfinished mint jobs and refreshes the per-status gauges.
pub async fn run_unfinished_job_reporter_loop(
    store: Arc<dyn StatusStore>,
    metrics: Arc<Metrics>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => break,
            _ = ticker.tick() => {
                if let Err(err) = report_unfinished_jobs(store.as_ref(), metrics.as_ref()) {
                    warn!("unfinished job report failed error={}", err);
                }
            }
        }
    }
}

fn report_unfinished_jobs(store: &dyn StatusStore, metrics: &Metrics) -> Result<(), PipelineError> {
    let now = now_nanos();
    let jobs = store.list_all()?;
    let stats = QueueStats::from_jobs(&jobs, now);
    metrics.set_job_counts(&stats);

    let count = |status: MintStatus| stats.by_status.get(&status).copied().unwrap_or(0);
    let mut unfinished: Vec<&MintJob> = jobs.iter().filter(|job| !job.is_terminal()).collect();
    let snapshot = metrics.snapshot();

    if unfinished.is_empty() {
        info!(
            "unfinished jobs report: none (completed={} skipped={} permanently_failed={} minted_since_start={} uptime_minutes={})",
            count(MintStatus::Completed),
            count(MintStatus::Skipped),
            jobs.iter().filter(|job| job.is_permanently_failed()).count(),
            snapshot.mints_completed,
            snapshot.uptime.as_secs() / 60
        );
        return Ok(());
    }

    unfinished.sort_by(|a, b| a.updated_at_nanos.cmp(&b.updated_at_nanos).then_with(|| a.job_id.cmp(&b.job_id)));
    let total = unfinished.len();
    let truncated = total.saturating_sub(MAX_JOBS_TO_LOG);

    info!(
        "unfinished jobs report: total={} (pending={} checking_dedup={} submitting={} awaiting_confirmation={} failed_retrying={}){}",
        total,
        count(MintStatus::Pending),
        count(MintStatus::CheckingDedup),
        count(MintStatus::Submitting),
        count(MintStatus::AwaitingConfirmation),
        unfinished.iter().filter(|job| job.status == MintStatus::Failed).count(),
        if truncated > 0 { format!(" truncated={}", truncated) } else { String::new() }
    );

    for job in unfinished.into_iter().take(MAX_JOBS_TO_LOG) {
        let idle_seconds = now.saturating_sub(job.updated_at_nanos) / NANOS_PER_SECOND;
        info!(
            "unfinished job job_id={:#x} event_id={} status={} attempt={} idle_seconds={} last_error={}",
            job.job_id,
            job.event_id,
            job.status,
            job.attempt,
            idle_seconds,
            job.last_error.as_ref().map(|e| e.kind.as_str()).unwrap_or("-")
        );
    }
    Ok(())
}
