mod checkins_test;
mod events_test;
mod health_test;
mod jobs_test;

use attend_core::application::{
    AttendanceDedupOracle, CheckInIngestor, ConfirmationWatcher, CoordinatorConfig, MintCoordinator, MintObserver, ReadyQueue,
    StatusQueries, TransactionSubmitter,
};
use attend_core::domain::MetadataTemplate;
use attend_core::foundation::{JobId, WalletAddress};
use attend_core::infrastructure::config::LedgerConfig;
use attend_core::infrastructure::ledger::{GuardedLedger, LedgerClient, SimulatedLedger};
use attend_core::infrastructure::signer::LocalSigner;
use attend_core::infrastructure::storage::{RocksStatusStore, StatusStore};
use attend_service::api::{build_router, ApiState};
use attend_service::service::metrics::Metrics;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const ORGANIZER: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";
pub const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
pub const BOB: &str = "5DAAnrj7VHTznn2AWBemMuyBwZWs6FNFjdyVXUeYum3PTXFy";

pub struct TestApi {
    pub _dir: TempDir,
    pub router: Router,
    pub state: Arc<ApiState>,
    pub ledger: Arc<SimulatedLedger>,
    pub store: Arc<dyn StatusStore>,
    pub ready: mpsc::Receiver<JobId>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub json: serde_json::Value,
}

/// Full API state over a temp RocksDB and a simulated ledger. No scheduler runs; tests drive
/// jobs through `state.coordinator.process` when they need progress.
pub fn test_api(operator_token: Option<&str>) -> TestApi {
    let dir = TempDir::new().expect("temp dir");
    let store: Arc<dyn StatusStore> = Arc::new(RocksStatusStore::open_in_dir(dir.path(), false).expect("storage"));
    let ledger = Arc::new(SimulatedLedger::new());
    let guarded = Arc::new(GuardedLedger::new(ledger.clone(), LedgerConfig::default()));
    let client: Arc<dyn LedgerClient> = guarded.clone();
    let organizer = WalletAddress::from(ORGANIZER);
    let signer = Arc::new(LocalSigner::from_seed(organizer.clone(), &[9u8; 32]).expect("signer"));
    let metrics = Arc::new(Metrics::new().expect("metrics"));
    let observer: Arc<dyn MintObserver> = metrics.clone();

    let config = CoordinatorConfig { retry_base_delay_ms: 0, retry_max_delay_ms: 0, ..CoordinatorConfig::default() };
    let coordinator = Arc::new(MintCoordinator::new(
        store.clone(),
        AttendanceDedupOracle::new(client.clone()),
        TransactionSubmitter::new(client.clone(), signer, ORGANIZER, organizer),
        ConfirmationWatcher::new(client),
        observer.clone(),
        config,
        MetadataTemplate { image_url: "https://img.example/nft.png".to_string(), default_location: "Virtual".to_string() },
    ));
    let (queue, ready) = ReadyQueue::channel(64);
    let ingestor = Arc::new(CheckInIngestor::new(store.clone(), coordinator.clone(), queue.clone(), observer));

    let state = Arc::new(ApiState {
        ingestor,
        coordinator,
        queries: StatusQueries::new(store.clone()),
        queue,
        ledger: guarded,
        metrics,
        operator_token: operator_token.map(str::to_string),
        max_body_bytes: 64 * 1024,
    });
    let router = build_router(state.clone());
    TestApi { _dir: dir, router, state, ledger, store, ready }
}

pub async fn call(router: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    let mut request = builder.body(body).expect("request");
    request.extensions_mut().insert(ConnectInfo(std::net::SocketAddr::from(([127, 0, 0, 1], 40_000))));

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let text = String::from_utf8_lossy(&bytes).to_string();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    Reply { status, headers, text, json }
}

pub fn check_in(check_in_id: &str, event_id: &str, wallet: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "checkInId": check_in_id,
        "eventId": event_id,
        "walletAddress": wallet,
        "attendeeName": "Alice",
        "occurredAt": "2024-03-15T10:30:00Z",
        "eventName": "RustConf",
    })
}
