use crate::fixtures::{pipeline, CheckInBuilder, TEST_EVENT_ID};
use attend_core::application::StatusQueries;
use attend_core::foundation::{now_nanos, EventId};
use attend_core::infrastructure::storage::{RocksStatusStore, StatusStore};
use std::sync::Arc;

#[tokio::test]
async fn completed_jobs_and_records_survive_reopen() {
    let mut p = pipeline();
    p.ingestor.ingest_wire(CheckInBuilder::default().build()).expect("ingest");
    p.ingestor.ingest_wire(CheckInBuilder::default().check_in_id("c2").wallet(None).build()).expect("ingest");
    p.drain().await;

    let event = EventId::from(TEST_EVENT_ID);
    let summary = StatusQueries::new(p.store.clone()).event_summary(&event).expect("summary");
    assert_eq!((summary.total_checkins, summary.with_wallet, summary.minted, summary.skipped), (2, 1, 1, 1));

    let dir = p.dir;
    drop(p.ingestor);
    drop(p.coordinator);
    drop(p.store);

    let reopened = Arc::new(RocksStatusStore::open_in_dir(dir.path(), false).expect("reopen"));
    let queries = StatusQueries::new(reopened.clone());
    assert_eq!(queries.event_summary(&event).expect("summary"), summary);
    assert_eq!(reopened.list_nft_records_by_event(&event).expect("records").len(), 1);
    assert!(queries.queue_stats(now_nanos()).expect("stats").errors.healthy);
}
