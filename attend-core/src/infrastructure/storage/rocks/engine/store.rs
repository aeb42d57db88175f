use super::RocksStatusStore;
use crate::domain::{CheckIn, MintJob, MintStatus, NftRecord};
use crate::foundation::{CheckInId, EventId, JobId, PipelineError};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::lock_for_write;
use crate::infrastructure::storage::{Result, StatusStore};
use crate::storage_err;
use log::{debug, warn};
use rocksdb::WriteBatch;

impl RocksStatusStore {
    fn job_key(job_id: &JobId) -> Vec<u8> {
        KeyBuilder::with_capacity(32).hash32(job_id.as_hash()).build()
    }

    fn job_index_key(event_id: &EventId, job_id: &JobId) -> Vec<u8> {
        KeyBuilder::with_capacity(4 + event_id.len() + 32).str_lp(event_id).hash32(job_id.as_hash()).build()
    }

    fn checkin_key(check_in_id: &CheckInId) -> Vec<u8> {
        KeyBuilder::with_capacity(check_in_id.len()).str(check_in_id).build()
    }

    fn checkin_index_key(event_id: &EventId, check_in_id: &CheckInId) -> Vec<u8> {
        KeyBuilder::with_capacity(4 + event_id.len() + check_in_id.len()).str_lp(event_id).str(check_in_id).build()
    }

    fn decode_job_id(bytes: &[u8], index: &str) -> Result<JobId> {
        let hash: [u8; 32] = bytes.try_into().map_err(|_| PipelineError::StorageError {
            operation: format!("{} decode", index),
            details: format!("corrupt index key length {}", bytes.len()),
        })?;
        Ok(JobId::from(hash))
    }

    fn job_ids_for_event(&self, event_id: &EventId) -> Result<Vec<JobId>> {
        self.scan_prefix(CF_JOB_BY_EVENT, &Self::key_event_prefix(event_id))?
            .iter()
            .map(|suffix| Self::decode_job_id(suffix, CF_JOB_BY_EVENT))
            .collect()
    }

    /// Writes the job and keeps the active index in step with its status.
    fn put_job(&self, batch: &mut WriteBatch, job: &MintJob, with_index: bool) -> Result<()> {
        let key = Self::job_key(&job.job_id);
        batch.put_cf(self.cf_handle(CF_JOB)?, &key, Self::encode(job)?);
        if with_index {
            batch.put_cf(self.cf_handle(CF_JOB_BY_EVENT)?, Self::job_index_key(&job.event_id, &job.job_id), b"");
        }
        let active_cf = self.cf_handle(CF_JOB_ACTIVE)?;
        if job.is_terminal() {
            batch.delete_cf(active_cf, &key);
        } else {
            batch.put_cf(active_cf, &key, b"");
        }
        Ok(())
    }

    fn write(&self, batch: WriteBatch, operation: &str) -> Result<()> {
        self.db.write(batch).map_err(|err| storage_err!(format!("rocksdb write {}", operation), err))
    }
}

impl StatusStore for RocksStatusStore {
    fn upsert(&self, job: &MintJob) -> Result<()> {
        if let Some(stored) = self.get(&job.job_id)? {
            if stored.updated_at_nanos > job.updated_at_nanos {
                warn!(
                    "overwriting newer job record job_id={:#x} stored_updated_at={} incoming_updated_at={} stored_status={} incoming_status={}",
                    job.job_id, stored.updated_at_nanos, job.updated_at_nanos, stored.status, job.status
                );
            }
        }
        let mut batch = WriteBatch::default();
        self.put_job(&mut batch, job, true)?;
        self.write(batch, "upsert_job")
    }

    fn get(&self, job_id: &JobId) -> Result<Option<MintJob>> {
        self.get_value(CF_JOB, &Self::job_key(job_id))
    }

    fn list_by_event(&self, event_id: &EventId) -> Result<Vec<MintJob>> {
        let mut jobs = Vec::new();
        for job_id in self.job_ids_for_event(event_id)? {
            match self.get(&job_id)? {
                Some(job) => jobs.push(job),
                None => warn!("job index points at missing job event_id={} job_id={:#x}", event_id, job_id),
            }
        }
        jobs.sort_by_key(|job| (job.created_at_nanos, job.job_id));
        Ok(jobs)
    }

    fn list_all(&self) -> Result<Vec<MintJob>> {
        let mut jobs: Vec<MintJob> = self.scan_values(CF_JOB)?;
        jobs.sort_by_key(|job| (job.created_at_nanos, job.job_id));
        Ok(jobs)
    }

    fn list_active(&self) -> Result<Vec<MintJob>> {
        let mut jobs = Vec::new();
        for key in self.scan_prefix(CF_JOB_ACTIVE, &[])? {
            let job_id = Self::decode_job_id(&key, CF_JOB_ACTIVE)?;
            match self.get(&job_id)? {
                Some(job) if !job.is_terminal() => jobs.push(job),
                Some(_) => {}
                None => warn!("active index points at missing job job_id={:#x}", job_id),
            }
        }
        jobs.sort_by_key(|job| (job.created_at_nanos, job.job_id));
        Ok(jobs)
    }

    fn create_job_if_absent(&self, job: MintJob) -> Result<(MintJob, bool)> {
        let _guard = lock_for_write(&self.write_lock, "create_job_if_absent")?;
        if let Some(existing) = self.get(&job.job_id)? {
            return Ok((existing, false));
        }
        let mut batch = WriteBatch::default();
        self.put_job(&mut batch, &job, true)?;
        self.write(batch, "create_job")?;
        debug!("job created job_id={:#x} event_id={} status={}", job.job_id, job.event_id, job.status);
        Ok((job, true))
    }

    fn insert_checkin_if_absent(&self, check_in: &CheckIn) -> Result<bool> {
        let _guard = lock_for_write(&self.write_lock, "insert_checkin_if_absent")?;
        let key = Self::checkin_key(&check_in.check_in_id);
        let cf = self.cf_handle(CF_CHECKIN)?;
        if self.db.get_pinned_cf(cf, &key).map_err(|err| storage_err!("rocksdb get checkin", err))?.is_some() {
            return Ok(false);
        }
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, &key, Self::encode(check_in)?);
        batch.put_cf(self.cf_handle(CF_CHECKIN_BY_EVENT)?, Self::checkin_index_key(&check_in.event_id, &check_in.check_in_id), b"");
        self.write(batch, "insert_checkin")?;
        Ok(true)
    }

    fn get_checkin(&self, check_in_id: &CheckInId) -> Result<Option<CheckIn>> {
        self.get_value(CF_CHECKIN, &Self::checkin_key(check_in_id))
    }

    fn list_checkins_by_event(&self, event_id: &EventId) -> Result<Vec<CheckIn>> {
        let mut checkins = Vec::new();
        for suffix in self.scan_prefix(CF_CHECKIN_BY_EVENT, &Self::key_event_prefix(event_id))? {
            let id = String::from_utf8(suffix).map_err(|err| storage_err!("checkin_by_event decode", err))?;
            if let Some(check_in) = self.get_checkin(&CheckInId::new(id))? {
                checkins.push(check_in);
            }
        }
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
        let _guard = lock_for_write(&self.write_lock, "complete_job")?;
        let nft_cf = self.cf_handle(CF_NFT)?;
        let key = Self::job_key(&job.job_id);
        if self.db.get_pinned_cf(nft_cf, &key).map_err(|err| storage_err!("rocksdb get nft", err))?.is_some() {
            return Err(PipelineError::StorageError {
                operation: "complete_job".to_string(),
                details: format!("nft record already exists for job {:#x}", job.job_id),
            });
        }
        let mut batch = WriteBatch::default();
        self.put_job(&mut batch, job, true)?;
        batch.put_cf(nft_cf, &key, Self::encode(record)?);
        self.write(batch, "complete_job")
    }

    fn get_nft_record(&self, job_id: &JobId) -> Result<Option<NftRecord>> {
        self.get_value(CF_NFT, &Self::job_key(job_id))
    }

    fn list_nft_records_by_event(&self, event_id: &EventId) -> Result<Vec<NftRecord>> {
        let mut records = Vec::new();
        for job_id in self.job_ids_for_event(event_id)? {
            if let Some(record) = self.get_nft_record(&job_id)? {
                records.push(record);
            }
        }
        records.sort_by_key(|record| record.contract_token_id);
        Ok(records)
    }

    fn health_check(&self) -> Result<()> {
        self.schema_version()?.map(|_| ()).ok_or_else(|| PipelineError::StorageError {
            operation: "health_check".to_string(),
            details: "schema version missing".to_string(),
        })
    }
}
