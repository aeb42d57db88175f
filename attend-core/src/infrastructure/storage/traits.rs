use crate::domain::{CheckIn, MintJob, NftRecord};
use crate::foundation::{CheckInId, EventId, JobId, PipelineError};

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Persistence contract for the pipeline.
///
/// The store records what it is told. Job transitions are decided by the coordinator, which
/// holds the per-job lock around every write for a given job.
pub trait StatusStore: Send + Sync {
    fn upsert(&self, job: &MintJob) -> Result<()>;
    fn get(&self, job_id: &JobId) -> Result<Option<MintJob>>;
    fn list_by_event(&self, event_id: &EventId) -> Result<Vec<MintJob>>;
    fn list_all(&self) -> Result<Vec<MintJob>>;

    /// Jobs that still have work ahead of them, including FAILED jobs with retries left.
    fn list_active(&self) -> Result<Vec<MintJob>> {
        Ok(self.list_all()?.into_iter().filter(|job| !job.is_terminal()).collect())
    }

    /// Stores `job` unless a job with the same id exists.
    /// Returns the stored job and `true` when this call created it.
    fn create_job_if_absent(&self, job: MintJob) -> Result<(MintJob, bool)>;

    /// Returns `Ok(true)` if inserted, `Ok(false)` if the check-in id was already recorded.
    fn insert_checkin_if_absent(&self, check_in: &CheckIn) -> Result<bool>;
    fn get_checkin(&self, check_in_id: &CheckInId) -> Result<Option<CheckIn>>;
    fn list_checkins_by_event(&self, event_id: &EventId) -> Result<Vec<CheckIn>>;

    /// Writes the COMPLETED job and its NFT record in one atomic batch.
    fn complete_job(&self, job: &MintJob, record: &NftRecord) -> Result<()>;
    fn get_nft_record(&self, job_id: &JobId) -> Result<Option<NftRecord>>;
    fn list_nft_records_by_event(&self, event_id: &EventId) -> Result<Vec<NftRecord>>;

    fn health_check(&self) -> Result<()>;
}
