use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCheckIn,
    InvalidWalletAddress,
    JobNotFound,
    JobBusy,
    InvalidStateTransition,
    OperatorActionRejected,
    StorageError,
    StorageLockTimeout,
    SchemaMismatch,
    SerializationError,
    EncodingError,
    ParseError,
    ConfigError,
    LedgerError,
    GasEstimationFailed,
    SubmissionRejected,
    SignerUnavailable,
    SigningFailed,
    SecretNotFound,
    SecretDecodeFailed,
    NetworkError,
    Timeout,
    CircuitOpen,
    MetricsError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid check-in: {0}")]
    InvalidCheckIn(String),

    #[error("invalid wallet address: {0}")]
    InvalidWalletAddress(String),

    #[error("mint job not found: {0}")]
    JobNotFound(String),

    #[error("mint job busy: {job_id}")]
    JobBusy { job_id: String },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("operator action rejected for job {job_id}: {reason}")]
    OperatorActionRejected { job_id: String, reason: String },

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout during {operation} after {timeout_secs}s")]
    StorageLockTimeout { operation: String, timeout_secs: u64 },

    #[error("schema mismatch: stored={stored} current={current}")]
    SchemaMismatch { stored: u32, current: u32 },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("ledger error during {operation}: {details}")]
    LedgerError { operation: String, details: String },

    #[error("cost estimation failed: {0}")]
    GasEstimationFailed(String),

    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("secret not found: {name} (backend: {backend})")]
    SecretNotFound { name: String, backend: String },

    #[error("secret decode failed: {name} (encoding: {encoding}, details: {details})")]
    SecretDecodeFailed { name: String, encoding: String, details: String },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("timeout during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("circuit breaker open for {0}")]
    CircuitOpen(String),

    #[error("metrics error during {operation}: {details}")]
    MetricsError { operation: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::InvalidCheckIn(_) => ErrorCode::InvalidCheckIn,
            PipelineError::InvalidWalletAddress(_) => ErrorCode::InvalidWalletAddress,
            PipelineError::JobNotFound(_) => ErrorCode::JobNotFound,
            PipelineError::JobBusy { .. } => ErrorCode::JobBusy,
            PipelineError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            PipelineError::OperatorActionRejected { .. } => ErrorCode::OperatorActionRejected,
            PipelineError::StorageError { .. } => ErrorCode::StorageError,
            PipelineError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            PipelineError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            PipelineError::SerializationError { .. } => ErrorCode::SerializationError,
            PipelineError::EncodingError(_) => ErrorCode::EncodingError,
            PipelineError::ParseError(_) => ErrorCode::ParseError,
            PipelineError::ConfigError(_) => ErrorCode::ConfigError,
            PipelineError::LedgerError { .. } => ErrorCode::LedgerError,
            PipelineError::GasEstimationFailed(_) => ErrorCode::GasEstimationFailed,
            PipelineError::SubmissionRejected(_) => ErrorCode::SubmissionRejected,
            PipelineError::SignerUnavailable(_) => ErrorCode::SignerUnavailable,
            PipelineError::SigningFailed(_) => ErrorCode::SigningFailed,
            PipelineError::SecretNotFound { .. } => ErrorCode::SecretNotFound,
            PipelineError::SecretDecodeFailed { .. } => ErrorCode::SecretDecodeFailed,
            PipelineError::NetworkError(_) => ErrorCode::NetworkError,
            PipelineError::Timeout { .. } => ErrorCode::Timeout,
            PipelineError::CircuitOpen(_) => ErrorCode::CircuitOpen,
            PipelineError::MetricsError { .. } => ErrorCode::MetricsError,
            PipelineError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    /// Transport-level failures: the ledger was not reached, so nothing is known about the call's effect.
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::NetworkError(_) | PipelineError::Timeout { .. } | PipelineError::CircuitOpen(_))
    }

    pub fn ledger(operation: impl Into<String>, details: impl ToString) -> Self {
        PipelineError::LedgerError { operation: operation.into(), details: details.to_string() }
    }

    pub fn job_not_found(job_id: impl ToString) -> Self {
        PipelineError::JobNotFound(job_id.to_string())
    }
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        PipelineError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<hex::FromHexError> for PipelineError {
    fn from(err: hex::FromHexError) -> Self {
        PipelineError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<rocksdb::Error> for PipelineError {
    fn from(err: rocksdb::Error) -> Self {
        PipelineError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            PipelineError::NetworkError(err.to_string())
        } else {
            PipelineError::LedgerError { operation: "http".to_string(), details: err.to_string() }
        }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::PipelineError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

#[macro_export]
macro_rules! serde_err {
    ($fmt:expr, $err:expr) => {
        $crate::foundation::PipelineError::SerializationError { format: $fmt.into(), details: $err.to_string() }
    };
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `PipelineError` variants at the call site to preserve context.
