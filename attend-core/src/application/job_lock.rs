use crate::foundation::JobId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// In-process exclusion keyed on job id: at most one execution per job at a time.
#[derive(Clone, Default)]
pub struct JobLocks {
    held: Arc<Mutex<HashSet<JobId>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when another execution holds the job; the lock is released when the guard drops.
    pub fn try_acquire(&self, job_id: &JobId) -> Option<JobLockGuard> {
        let mut held = self.held.lock();
        if !held.insert(*job_id) {
            return None;
        }
        Some(JobLockGuard { locks: self.clone(), job_id: *job_id })
    }

    pub fn is_locked(&self, job_id: &JobId) -> bool {
        self.held.lock().contains(job_id)
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }
}

pub struct JobLockGuard {
    locks: JobLocks,
    job_id: JobId,
}

impl JobLockGuard {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }
}

impl Drop for JobLockGuard {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.job_id);
    }
}
