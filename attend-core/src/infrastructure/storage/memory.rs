use crate::domain::{CheckIn, MintJob, MintStatus, NftRecord};
use crate::foundation::{CheckInId, EventId, JobId, PipelineError};
use crate::infrastructure::storage::{Result, StatusStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    checkins: HashMap<CheckInId, CheckIn>,
    jobs: HashMap<JobId, MintJob>,
    nfts: HashMap<JobId, NftRecord>,
    writes: usize,
}

/// In-memory `StatusStore` for tests.
#[derive(Default)]
pub struct MemoryStatusStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of job writes so far (upserts, creates and completions).
    pub fn job_writes(&self) -> usize {
        self.lock_inner().map(|inner| inner.writes).unwrap_or(0)
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| PipelineError::StorageError { operation: "memory store lock".to_string(), details: "poisoned".to_string() })
    }
}

impl StatusStore for MemoryStatusStore {
    fn upsert(&self, job: &MintJob) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.writes += 1;
        inner.jobs.insert(job.job_id, job.clone());
        Ok(())
    }

    fn get(&self, job_id: &JobId) -> Result<Option<MintJob>> {
        Ok(self.lock_inner()?.jobs.get(job_id).cloned())
    }

    fn list_by_event(&self, event_id: &EventId) -> Result<Vec<MintJob>> {
        let mut jobs: Vec<_> = self.lock_inner()?.jobs.values().filter(|job| &job.event_id == event_id).cloned().collect();
        jobs.sort_by_key(|job| (job.created_at_nanos, job.job_id));
        Ok(jobs)
    }

    fn list_all(&self) -> Result<Vec<MintJob>> {
        let mut jobs: Vec<_> = self.lock_inner()?.jobs.values().cloned().collect();
        jobs.sort_by_key(|job| (job.created_at_nanos, job.job_id));
        Ok(jobs)
    }

    fn create_job_if_absent(&self, job: MintJob) -> Result<(MintJob, bool)> {
        let mut inner = self.lock_inner()?;
        if let Some(existing) = inner.jobs.get(&job.job_id) {
            return Ok((existing.clone(), false));
        }
        inner.writes += 1;
        inner.jobs.insert(job.job_id, job.clone());
        Ok((job, true))
    }

    fn insert_checkin_if_absent(&self, check_in: &CheckIn) -> Result<bool> {
        let mut inner = self.lock_inner()?;
        if inner.checkins.contains_key(&check_in.check_in_id) {
            return Ok(false);
        }
        inner.checkins.insert(check_in.check_in_id.clone(), check_in.clone());
        Ok(true)
    }

    fn get_checkin(&self, check_in_id: &CheckInId) -> Result<Option<CheckIn>> {
        Ok(self.lock_inner()?.checkins.get(check_in_id).cloned())
    }

    fn list_checkins_by_event(&self, event_id: &EventId) -> Result<Vec<CheckIn>> {
        let mut checkins: Vec<_> = self.lock_inner()?.checkins.values().filter(|c| &c.event_id == event_id).cloned().collect();
        checkins.sort_by(|a, b| (a.received_at_nanos, &a.check_in_id).cmp(&(b.received_at_nanos, &b.check_in_id)));
        Ok(checkins)
    }

    fn complete_job(&self, job: &MintJob, record: &NftRecord) -> Result<()> {
        if job.status != MintStatus::Completed || record.job_id != job.job_id {
            return Err(PipelineError::StorageError {
                operation: "complete_job".to_string(),
                details: format!("job {:#x} is {} or record belongs to another job", job.job_id, job.status),
            });
        }
        let mut inner = self.lock_inner()?;
        if inner.nfts.contains_key(&job.job_id) {
            return Err(PipelineError::StorageError {
                operation: "complete_job".to_string(),
                details: format!("nft record already exists for job {:#x}", job.job_id),
            });
        }
        inner.writes += 1;
        inner.jobs.insert(job.job_id, job.clone());
        inner.nfts.insert(job.job_id, record.clone());
        Ok(())
    }

    fn get_nft_record(&self, job_id: &JobId) -> Result<Option<NftRecord>> {
        Ok(self.lock_inner()?.nfts.get(job_id).cloned())
    }

    fn list_nft_records_by_event(&self, event_id: &EventId) -> Result<Vec<NftRecord>> {
        let mut records: Vec<_> = self.lock_inner()?.nfts.values().filter(|r| &r.event_id == event_id).cloned().collect();
        records.sort_by_key(|record| record.contract_token_id);
        Ok(records)
    }

    fn health_check(&self) -> Result<()> {
        self.lock_inner().map(|_| ())
    }
}
