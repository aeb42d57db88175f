mod backoff;
mod hashes;
mod state_machine;
mod types;

pub use backoff::exponential_delay_ms;
pub use hashes::derive_job_id;
pub use state_machine::{
    apply_transition, ensure_operator_reset, ensure_valid_transition, is_terminal, validate_transition, StateTransitionResult,
};
pub use types::{JobError, JobErrorKind, MintJob, MintStatus, SkipReason};
