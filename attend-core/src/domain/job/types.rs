use crate::domain::ledger::BlockRef;
use crate::domain::metadata::MintMetadata;
use crate::foundation::{CheckInId, EventId, JobId, TxHash, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MintStatus {
    Pending,
    CheckingDedup,
    Submitting,
    AwaitingConfirmation,
    Completed,
    Failed,
    Skipped,
}

impl MintStatus {
    pub const ALL: [MintStatus; 7] = [
        MintStatus::Pending,
        MintStatus::CheckingDedup,
        MintStatus::Submitting,
        MintStatus::AwaitingConfirmation,
        MintStatus::Completed,
        MintStatus::Failed,
        MintStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MintStatus::Pending => "PENDING",
            MintStatus::CheckingDedup => "CHECKING_DEDUP",
            MintStatus::Submitting => "SUBMITTING",
            MintStatus::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            MintStatus::Completed => "COMPLETED",
            MintStatus::Failed => "FAILED",
            MintStatus::Skipped => "SKIPPED",
        }
    }

    /// States a live worker may be holding; found at startup they indicate a crash.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, MintStatus::CheckingDedup | MintStatus::Submitting | MintStatus::AwaitingConfirmation)
    }
}

impl fmt::Display for MintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum JobErrorKind {
    NoWallet,
    AlreadyAttended,
    GasEstimationFailure,
    SubmissionRejected,
    ConfirmationTimeout,
    LedgerRevert,
    NetworkError,
    /// The ledger answered the attendance query with a definitive error.
    AttendanceQueryFailed,
    /// Process stopped between signing and learning the submission result.
    Interrupted,
}

impl JobErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JobErrorKind::GasEstimationFailure
                | JobErrorKind::SubmissionRejected
                | JobErrorKind::ConfirmationTimeout
                | JobErrorKind::NetworkError
                | JobErrorKind::AttendanceQueryFailed
                | JobErrorKind::Interrupted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobErrorKind::NoWallet => "NoWallet",
            JobErrorKind::AlreadyAttended => "AlreadyAttended",
            JobErrorKind::GasEstimationFailure => "GasEstimationFailure",
            JobErrorKind::SubmissionRejected => "SubmissionRejected",
            JobErrorKind::ConfirmationTimeout => "ConfirmationTimeout",
            JobErrorKind::LedgerRevert => "LedgerRevert",
            JobErrorKind::NetworkError => "NetworkError",
            JobErrorKind::AttendanceQueryFailed => "AttendanceQueryFailed",
            JobErrorKind::Interrupted => "Interrupted",
        }
    }
}

impl fmt::Display for JobErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last error recorded verbatim on a job for operator diagnosis.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobError {
    pub kind: JobErrorKind,
    pub message: String,
    pub at_nanos: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum SkipReason {
    NoWallet,
    AlreadyAttended,
}

impl SkipReason {
    pub fn error_kind(&self) -> JobErrorKind {
        match self {
            SkipReason::NoWallet => JobErrorKind::NoWallet,
            SkipReason::AlreadyAttended => JobErrorKind::AlreadyAttended,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MintJob {
    pub job_id: JobId,
    pub event_id: EventId,
    pub wallet_address: WalletAddress,
    /// Check-in that created the job; later duplicates do not overwrite it.
    pub check_in_id: CheckInId,
    pub status: MintStatus,
    pub attempt: u32,
    pub transaction_hash: Option<TxHash>,
    pub block_reference: Option<BlockRef>,
    pub last_error: Option<JobError>,
    pub skip_reason: Option<SkipReason>,
    /// Set when FAILED has used up its automatic attempts (or failed terminally).
    pub retry_exhausted: bool,
    /// Transport failures of the attendance query within the current attempt.
    pub dedup_query_failures: u32,
    /// Earliest time the scheduler may pick the job up again; 0 means ready.
    pub not_before_nanos: u64,
    pub metadata: MintMetadata,
    pub created_at_nanos: u64,
    pub updated_at_nanos: u64,
}

impl MintJob {
    pub fn new(
        job_id: JobId,
        event_id: EventId,
        wallet_address: WalletAddress,
        check_in_id: CheckInId,
        metadata: MintMetadata,
        now_nanos: u64,
    ) -> Self {
        Self {
            job_id,
            event_id,
            wallet_address,
            check_in_id,
            status: MintStatus::Pending,
            attempt: 0,
            transaction_hash: None,
            block_reference: None,
            last_error: None,
            skip_reason: None,
            retry_exhausted: false,
            dedup_query_failures: 0,
            not_before_nanos: 0,
            metadata,
            created_at_nanos: now_nanos,
            updated_at_nanos: now_nanos,
        }
    }

    /// A job created directly in SKIPPED (no usable wallet at ingestion).
    pub fn skipped(mut self, reason: SkipReason, message: impl Into<String>, now_nanos: u64) -> Self {
        self.status = MintStatus::Skipped;
        self.skip_reason = Some(reason);
        self.last_error = Some(JobError { kind: reason.error_kind(), message: message.into(), at_nanos: now_nanos });
        self
    }

    pub fn is_terminal(&self) -> bool {
        super::state_machine::is_terminal(self)
    }

    pub fn is_ready(&self, now_nanos: u64) -> bool {
        !self.is_terminal() && self.not_before_nanos <= now_nanos
    }

    pub fn is_permanently_failed(&self) -> bool {
        self.status == MintStatus::Failed && self.retry_exhausted
    }

    pub fn record_error(&mut self, kind: JobErrorKind, message: impl Into<String>, now_nanos: u64) {
        self.last_error = Some(JobError { kind, message: message.into(), at_nanos: now_nanos });
    }
}
