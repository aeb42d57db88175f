//! Application layer: the check-in to mint pipeline wired from domain rules and adapters.

pub mod coordinator;
pub mod ingestor;
pub mod job_lock;
pub mod lifecycle;
pub mod oracle;
pub mod queue;
pub mod status;
pub mod submitter;
pub mod watcher;

pub use coordinator::{CoordinatorConfig, MintCoordinator, ProcessOutcome};
pub use ingestor::{BatchItemOutcome, BulkMintReport, CheckInIngestor, IngestOutcome};
pub use job_lock::{JobLockGuard, JobLocks};
pub use lifecycle::{confirmation_label, AuditLoggingObserver, CompositeObserver, MintObserver, NoopObserver};
pub use oracle::AttendanceDedupOracle;
pub use queue::ReadyQueue;
pub use status::{JobDetail, StatusQueries};
pub use submitter::{SubmissionError, TransactionSubmitter};
pub use watcher::ConfirmationWatcher;
