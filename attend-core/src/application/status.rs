use crate::domain::{EventMintSummary, MintJob, NftRecord, QueueStats};
use crate::foundation::{EventId, JobId, PipelineError};
use crate::infrastructure::storage::StatusStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Debug, Serialize)]
pub struct JobDetail {
    pub job: MintJob,
    pub permanently_failed: bool,
    pub nft: Option<NftRecord>,
}

/// Read side for the dashboard; everything is derived from stored jobs on each call.
#[derive(Clone)]
pub struct StatusQueries {
    store: Arc<dyn StatusStore>,
}

impl StatusQueries {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    pub fn event_summary(&self, event_id: &EventId) -> Result<EventMintSummary, PipelineError> {
        let check_ins = self.store.list_checkins_by_event(event_id)?;
        let jobs = self.store.list_by_event(event_id)?;
        Ok(EventMintSummary::from_records(event_id, &check_ins, &jobs))
    }

    pub fn event_jobs(&self, event_id: &EventId) -> Result<Vec<MintJob>, PipelineError> {
        let mut jobs = self.store.list_by_event(event_id)?;
        jobs.sort_by(|a, b| a.created_at_nanos.cmp(&b.created_at_nanos).then(a.job_id.cmp(&b.job_id)));
        Ok(jobs)
    }

    pub fn job_detail(&self, job_id: &JobId) -> Result<Option<JobDetail>, PipelineError> {
        let Some(job) = self.store.get(job_id)? else {
            return Ok(None);
        };
        let nft = self.store.get_nft_record(job_id)?;
        Ok(Some(JobDetail { permanently_failed: job.is_permanently_failed(), job, nft }))
    }

    pub fn queue_stats(&self, now_nanos: u64) -> Result<QueueStats, PipelineError> {
        let jobs = self.store.list_all()?;
        Ok(QueueStats::from_jobs(&jobs, now_nanos))
    }

    pub fn health_check(&self) -> Result<(), PipelineError> {
        self.store.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckIn, EventDetails, MintMetadata, MintStatus};
    use crate::foundation::{CheckInId, WalletAddress};
    use crate::infrastructure::storage::MemoryStatusStore;

    #[test]
    fn summary_and_detail_read_from_store() {
        let store = Arc::new(MemoryStatusStore::new());
        let event = EventId::from("E1");
        let check_in = CheckIn {
            check_in_id: CheckInId::from("c1"),
            event_id: event.clone(),
            wallet_address: None,
            attendee_name: String::new(),
            occurred_at_nanos: 0,
            event: EventDetails::default(),
            received_at_nanos: 0,
        };
        store.insert_checkin_if_absent(&check_in).expect("insert");
        let job = MintJob::new(JobId::new([1; 32]), event.clone(), WalletAddress::from("w"), CheckInId::from("c1"), MintMetadata::default(), 1);
        store.create_job_if_absent(job.clone()).expect("create");

        let queries = StatusQueries::new(store);
        let summary = queries.event_summary(&event).expect("summary");
        assert_eq!(summary.total_checkins, 1);
        assert_eq!(summary.pending, 1);

        let detail = queries.job_detail(&job.job_id).expect("detail").expect("job");
        assert_eq!(detail.job.status, MintStatus::Pending);
        assert!(detail.nft.is_none());
        assert!(queries.job_detail(&JobId::new([2; 32])).expect("detail").is_none());
        assert_eq!(queries.queue_stats(0).expect("stats").total, 1);
    }
}
