use crate::foundation::JobId;
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Hand-off from ingestion to the scheduler's workers.
///
/// Pushing never blocks. A full or closed queue only delays a job: the periodic due-job scan
/// rediscovers everything that is ready from the store.
#[derive(Clone)]
pub struct ReadyQueue {
    tx: mpsc::Sender<JobId>,
}

impl ReadyQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<JobId>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn push(&self, job_id: JobId) -> bool {
        match self.tx.try_send(job_id) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("ready queue full, leaving job to the periodic scan job_id={:#x}", job_id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("ready queue closed job_id={:#x}", job_id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (queue, mut rx) = ReadyQueue::channel(1);
        assert!(queue.push(JobId::new([1; 32])));
        assert!(!queue.push(JobId::new([2; 32])));
        assert_eq!(rx.recv().await, Some(JobId::new([1; 32])));
        drop(rx);
        assert!(!queue.push(JobId::new([3; 32])));
    }
}
