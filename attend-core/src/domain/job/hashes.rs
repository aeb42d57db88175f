use crate::foundation::{EventId, JobId, JOB_ID_DOMAIN};
use blake3::Hasher;

/// Deterministic job id keyed on (event, normalized wallet), never on the check-in id,
/// so duplicate check-ins for one attendee collapse onto one job.
pub fn derive_job_id(event_id: &EventId, wallet_key: &str) -> JobId {
    let mut hasher = Hasher::new();
    hasher.update(JOB_ID_DOMAIN);
    update_len_prefixed(&mut hasher, event_id.as_bytes());
    update_len_prefixed(&mut hasher, wallet_key.as_bytes());
    JobId::from(*hasher.finalize().as_bytes())
}

fn update_len_prefixed(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u32).to_be_bytes());
    hasher.update(bytes);
}
