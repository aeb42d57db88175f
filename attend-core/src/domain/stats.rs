//! Read-side aggregates over stored jobs; nothing here is maintained incrementally.

use crate::domain::checkin::{classify_wallet, CheckIn};
use crate::domain::job::{JobErrorKind, MintJob, MintStatus};
use crate::foundation::{EventId, JobId, NANOS_PER_DAY, RECENT_FAILURES_LIMIT, UNHEALTHY_FAILURES_PER_DAY};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-event counts surfaced to the dashboard.
///
/// `pending` covers every job that can still progress (including FAILED jobs awaiting an
/// automatic retry). Permanently failed and skipped jobs are reported separately.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EventMintSummary {
    pub event_id: String,
    pub total_checkins: usize,
    pub with_wallet: usize,
    pub minted: usize,
    pub pending: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl EventMintSummary {
    pub fn from_records(event_id: &EventId, check_ins: &[CheckIn], jobs: &[MintJob]) -> Self {
        let mut summary = Self { event_id: event_id.to_string(), total_checkins: check_ins.len(), ..Self::default() };
        summary.with_wallet = check_ins.iter().filter(|c| classify_wallet(c.wallet_address.as_deref()).is_valid()).count();
        for job in jobs {
            match job.status {
                MintStatus::Completed => summary.minted += 1,
                MintStatus::Skipped => summary.skipped += 1,
                MintStatus::Failed if job.retry_exhausted => summary.failed += 1,
                _ => summary.pending += 1,
            }
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub job_id: JobId,
    pub event_id: String,
    pub kind: JobErrorKind,
    pub message: String,
    pub at_nanos: u64,
    pub permanent: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStats {
    /// Most frequent `lastError` kinds among FAILED jobs, descending.
    pub most_common: Vec<(JobErrorKind, usize)>,
    pub recent_failures: Vec<FailureEntry>,
    pub failures_last_24h: usize,
    pub healthy: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub by_status: BTreeMap<MintStatus, usize>,
    pub total: usize,
    pub errors: ErrorStats,
}

impl QueueStats {
    pub fn from_jobs<'a>(jobs: impl IntoIterator<Item = &'a MintJob>, now_nanos: u64) -> Self {
        let mut by_status: BTreeMap<MintStatus, usize> = MintStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut kind_counts: HashMap<JobErrorKind, usize> = HashMap::new();
        let mut failures = Vec::new();
        let mut total = 0usize;

        for job in jobs {
            total += 1;
            *by_status.entry(job.status).or_default() += 1;
            if job.status != MintStatus::Failed {
                continue;
            }
            if let Some(err) = &job.last_error {
                *kind_counts.entry(err.kind).or_default() += 1;
                failures.push(FailureEntry {
                    job_id: job.job_id,
                    event_id: job.event_id.to_string(),
                    kind: err.kind,
                    message: err.message.clone(),
                    at_nanos: err.at_nanos,
                    permanent: job.retry_exhausted,
                });
            }
        }

        let window_start = now_nanos.saturating_sub(NANOS_PER_DAY);
        let failures_last_24h = failures.iter().filter(|f| f.at_nanos >= window_start).count();
        failures.sort_by(|a, b| b.at_nanos.cmp(&a.at_nanos));
        failures.truncate(RECENT_FAILURES_LIMIT);

        let mut most_common: Vec<(JobErrorKind, usize)> = kind_counts.into_iter().collect();
        most_common.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        most_common.truncate(5);

        Self {
            by_status,
            total,
            errors: ErrorStats {
                most_common,
                recent_failures: failures,
                failures_last_24h,
                healthy: failures_last_24h < UNHEALTHY_FAILURES_PER_DAY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkin::EventDetails;
    use crate::domain::job::SkipReason;
    use crate::domain::metadata::MintMetadata;
    use crate::foundation::{CheckInId, WalletAddress};

    const WALLET: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    fn job(n: u8, status: MintStatus) -> MintJob {
        let mut job = MintJob::new(
            JobId::new([n; 32]),
            EventId::from("E1"),
            WalletAddress::from(WALLET),
            CheckInId::new(format!("c{}", n)),
            MintMetadata::default(),
            0,
        );
        job.status = status;
        job
    }

    fn check_in(id: &str, wallet: Option<&str>) -> CheckIn {
        CheckIn {
            check_in_id: CheckInId::from(id),
            event_id: EventId::from("E1"),
            wallet_address: wallet.map(str::to_string),
            attendee_name: String::new(),
            occurred_at_nanos: 0,
            event: EventDetails::default(),
            received_at_nanos: 0,
        }
    }

    #[test]
    fn event_summary_separates_failed_and_skipped() {
        let mut exhausted = job(3, MintStatus::Failed);
        exhausted.retry_exhausted = true;
        let jobs = vec![
            job(1, MintStatus::Completed),
            job(2, MintStatus::Failed),
            exhausted,
            job(4, MintStatus::AwaitingConfirmation),
            job(5, MintStatus::Pending).skipped(SkipReason::NoWallet, "missing", 0),
        ];
        let check_ins = vec![check_in("c1", Some(WALLET)), check_in("c2", None), check_in("c3", Some("junk"))];
        let summary = EventMintSummary::from_records(&EventId::from("E1"), &check_ins, &jobs);
        assert_eq!(summary.total_checkins, 3);
        assert_eq!(summary.with_wallet, 1);
        assert_eq!(summary.minted, 1);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn queue_stats_reports_unhealthy_after_ten_recent_failures() {
        let now = 10 * NANOS_PER_DAY;
        let jobs: Vec<MintJob> = (0..12u8)
            .map(|n| {
                let mut job = job(n, MintStatus::Failed);
                let kind = if n % 3 == 0 { JobErrorKind::LedgerRevert } else { JobErrorKind::ConfirmationTimeout };
                job.record_error(kind, "boom", now - u64::from(n));
                job
            })
            .collect();
        let stats = QueueStats::from_jobs(&jobs, now);
        assert_eq!(stats.total, 12);
        assert_eq!(stats.by_status[&MintStatus::Failed], 12);
        assert_eq!(stats.by_status[&MintStatus::Completed], 0);
        assert_eq!(stats.errors.most_common[0], (JobErrorKind::ConfirmationTimeout, 8));
        assert_eq!(stats.errors.recent_failures.len(), RECENT_FAILURES_LIMIT);
        assert_eq!(stats.errors.recent_failures[0].at_nanos, now);
        assert!(!stats.errors.healthy);
    }
}
