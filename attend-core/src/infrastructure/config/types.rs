use crate::domain::MetadataTemplate;
use crate::foundation::{
    DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_LEDGER_REQUEST_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_RETRY_MAX_DELAY_MS,
};
use crate::infrastructure::ledger::CircuitBreakerConfig;
use figment::value::{Dict, Map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub signer: SignerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default, skip_serializing)]
    pub profiles: Option<Map<String, Dict>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// RocksDB lives under `${data_dir}/mint-status`.
    pub data_dir: String,
    /// Directory for rolling log files; console only when unset.
    pub log_dir: Option<String>,
    /// Logger filter expression, e.g. `info,attend_core=debug`.
    pub log_filters: String,
    /// Wipe RocksDB on schema mismatch (devnet only).
    pub allow_schema_wipe: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { data_dir: String::new(), log_dir: None, log_filters: "info".to_string(), allow_schema_wipe: false }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Automatic mint attempts before FAILED becomes permanent.
    pub max_attempts: u32,
    /// Delay before attempt N+1 is `base * 2^(N-1)`, capped at `retry_max_delay_ms`.
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    /// Hard bound on a single confirmation wait.
    pub confirmation_timeout_secs: u64,
    /// Concurrent jobs allowed inside ledger-facing phases (dedup check and submission).
    pub worker_concurrency: usize,
    /// How often the scheduler scans the store for due jobs.
    pub scan_interval_ms: u64,
    /// Capacity of the in-memory ready queue.
    pub queue_capacity: usize,
    /// How often the unfinished-job reporter logs, 0 disables it.
    pub report_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            worker_concurrency: 4,
            scan_interval_ms: 1_000,
            queue_capacity: 1_024,
            report_interval_secs: 60,
        }
    }
}

impl PipelineConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMode {
    /// JSON gateway in front of the ledger node.
    #[default]
    Http,
    /// In-process simulated ledger that finalizes every mint (demos, local dashboards).
    DryRun,
}

impl fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerMode::Http => f.write_str("http"),
            LedgerMode::DryRun => f.write_str("dry_run"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportRetryConfig {
    /// Total tries per ledger call, including the first.
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for TransportRetryConfig {
    fn default() -> Self {
        Self { attempts: 3, base_delay_ms: 200, max_delay_ms: 2_000 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub mode: LedgerMode,
    pub gateway_url: String,
    /// Attendance contract the mint call targets.
    pub contract_address: String,
    /// Transport timeout for estimate/submit/query calls.
    pub request_timeout_ms: u64,
    /// Poll interval used to turn gateway status into a stream.
    pub status_poll_interval_ms: u64,
    pub transport_retry: TransportRetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::default(),
            gateway_url: "http://127.0.0.1:9944".to_string(),
            contract_address: String::new(),
            request_timeout_ms: DEFAULT_LEDGER_REQUEST_TIMEOUT_MS,
            status_poll_interval_ms: 1_000,
            transport_retry: TransportRetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Organizer account that signs mint transactions.
    pub organizer_wallet: String,
    /// Secret holding the 32-byte ed25519 seed (`ATTEND_SECRET__SIGNER__SEED`).
    pub secret_name: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self { organizer_wallet: String::new(), secret_name: "signer.seed".to_string() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub image_url: String,
    pub default_location: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { image_url: String::new(), default_location: "Virtual".to_string() }
    }
}

impl MetadataConfig {
    pub fn template(&self) -> MetadataTemplate {
        MetadataTemplate { image_url: self.image_url.clone(), default_location: self.default_location.clone() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: String,
    pub max_body_bytes: usize,
    /// Bearer / `x-api-key` token required by operator endpoints (retry, bulk mint); open when unset.
    pub operator_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { listen_addr: "127.0.0.1:8090".to_string(), max_body_bytes: 1024 * 1024, operator_token: None }
    }
}
