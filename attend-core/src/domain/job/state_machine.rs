use super::types::{MintJob, MintStatus};
use crate::foundation::PipelineError;
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct StateTransitionResult {
    pub valid: bool,
    pub from_state: String,
    pub to_state: String,
    pub transition_reason: Option<String>,
}

const VALID_TRANSITIONS: &[(MintStatus, MintStatus)] = &[
    (MintStatus::Pending, MintStatus::CheckingDedup),
    (MintStatus::CheckingDedup, MintStatus::Skipped),
    (MintStatus::CheckingDedup, MintStatus::Submitting),
    (MintStatus::CheckingDedup, MintStatus::Failed),
    (MintStatus::Submitting, MintStatus::AwaitingConfirmation),
    (MintStatus::Submitting, MintStatus::Failed),
    (MintStatus::AwaitingConfirmation, MintStatus::Completed),
    (MintStatus::AwaitingConfirmation, MintStatus::Failed),
    (MintStatus::Failed, MintStatus::CheckingDedup),
];

pub fn is_terminal(job: &MintJob) -> bool {
    match job.status {
        MintStatus::Completed | MintStatus::Skipped => true,
        MintStatus::Failed => job.retry_exhausted,
        _ => false,
    }
}

pub fn validate_transition(job: &MintJob, to: MintStatus) -> StateTransitionResult {
    let from = job.status;
    let result = |valid: bool, reason: Option<&str>| StateTransitionResult {
        valid,
        from_state: from.to_string(),
        to_state: to.to_string(),
        transition_reason: reason.map(str::to_string),
    };
    if is_terminal(job) {
        return result(false, Some("terminal"));
    }
    if from == to {
        return result(true, Some("no_op"));
    }
    if VALID_TRANSITIONS.contains(&(from, to)) {
        return result(true, None);
    }
    result(false, Some("not_allowed"))
}

pub fn ensure_valid_transition(job: &MintJob, to: MintStatus) -> Result<(), PipelineError> {
    let transition = validate_transition(job, to);
    if transition.valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidStateTransition { from: transition.from_state, to: transition.to_state })
    }
}

/// Applies a validated transition. Entering CHECKING_DEDUP from PENDING or FAILED
/// starts a new mint attempt.
pub fn apply_transition(job: &mut MintJob, to: MintStatus, now_nanos: u64) -> Result<StateTransitionResult, PipelineError> {
    let transition = validate_transition(job, to);
    if !transition.valid {
        warn!(
            "invalid mint job transition job_id={} event_id={} from_state={} to_state={} reason={:?}",
            job.job_id, job.event_id, transition.from_state, transition.to_state, transition.transition_reason
        );
        return Err(PipelineError::InvalidStateTransition { from: transition.from_state, to: transition.to_state });
    }
    let from = job.status;
    if to == MintStatus::CheckingDedup && matches!(from, MintStatus::Pending | MintStatus::Failed) {
        job.attempt = job.attempt.saturating_add(1);
        job.dedup_query_failures = 0;
    }
    job.status = to;
    job.updated_at_nanos = now_nanos;
    info!(
        "mint job transition job_id={} event_id={} from_state={} to_state={} attempt={}",
        job.job_id, job.event_id, from, to, job.attempt
    );
    Ok(transition)
}

/// Operator retry is the only way out of an exhausted FAILED; it never applies automatically.
pub fn ensure_operator_reset(job: &MintJob) -> Result<(), PipelineError> {
    if job.is_permanently_failed() {
        return Ok(());
    }
    Err(PipelineError::OperatorActionRejected {
        job_id: job.job_id.to_string(),
        reason: format!("only permanently FAILED jobs can be retried (status={} exhausted={})", job.status, job.retry_exhausted),
    })
}
