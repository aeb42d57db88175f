//! System-wide constants for the attendance minting pipeline.

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Nanoseconds per day (24 * 60 * 60 * 10^9).
///
/// Used for the "recent failures" health window on the queue stats endpoint.
pub const NANOS_PER_DAY: u64 = 24 * 60 * 60 * NANOS_PER_SECOND;

/// Environment variable that pins `now_nanos()` for deterministic tests.
pub const TEST_NOW_NANOS_ENV_VAR: &str = "ATTEND_TEST_NOW_NANOS";

/// Default cap on mint attempts before a job becomes permanently FAILED.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default hard wall-clock bound on a confirmation wait (60 seconds).
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 60;

/// Default per-call transport timeout for estimate/submit/query calls.
pub const DEFAULT_LEDGER_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Base delay between mint attempts; doubled per attempt.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 5_000;

/// Ceiling on the delay between mint attempts.
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 60_000;

/// Maximum length accepted for check-in and event identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Maximum length of the free-text fields copied into mint metadata.
pub const MAX_METADATA_FIELD_LENGTH: usize = 512;

/// Storage mutex acquisition bound.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Failures within the last day above which the queue reports unhealthy.
pub const UNHEALTHY_FAILURES_PER_DAY: usize = 10;

/// Number of recent failures surfaced on the queue stats endpoint.
pub const RECENT_FAILURES_LIMIT: usize = 10;

/// Domain separator for deterministic job ids.
pub const JOB_ID_DOMAIN: &[u8] = b"attend:job:v1";
