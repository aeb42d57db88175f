use crate::domain::checkin::is_valid_wallet;
use crate::infrastructure::config::types::{AppConfig, LedgerMode};

const MAX_CONFIRMATION_TIMEOUT_SECS: u64 = 600;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.pipeline.max_attempts == 0 {
            errors.push("pipeline.max_attempts must be > 0".to_string());
        }
        if self.pipeline.confirmation_timeout_secs == 0 {
            errors.push("pipeline.confirmation_timeout_secs must be > 0".to_string());
        }
        if self.pipeline.confirmation_timeout_secs > MAX_CONFIRMATION_TIMEOUT_SECS {
            errors.push(format!("pipeline.confirmation_timeout_secs should not exceed {}", MAX_CONFIRMATION_TIMEOUT_SECS));
        }
        if self.pipeline.worker_concurrency == 0 {
            errors.push("pipeline.worker_concurrency must be > 0".to_string());
        }
        if self.pipeline.queue_capacity == 0 {
            errors.push("pipeline.queue_capacity must be > 0".to_string());
        }
        if self.pipeline.retry_base_delay_ms > self.pipeline.retry_max_delay_ms {
            errors.push("pipeline.retry_base_delay_ms cannot exceed retry_max_delay_ms".to_string());
        }

        if self.ledger.request_timeout_ms == 0 {
            errors.push("ledger.request_timeout_ms must be > 0".to_string());
        }
        if self.ledger.transport_retry.attempts == 0 {
            errors.push("ledger.transport_retry.attempts must be > 0".to_string());
        }
        if self.ledger.mode == LedgerMode::Http {
            let url = self.ledger.gateway_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("ledger.gateway_url must be an http(s) url: {:?}", url));
            }
            if self.ledger.contract_address.trim().is_empty() {
                errors.push("ledger.contract_address is required when ledger.mode=http".to_string());
            }
        }

        if !is_valid_wallet(&self.signer.organizer_wallet) {
            errors.push(format!("signer.organizer_wallet is not a valid account: {:?}", self.signer.organizer_wallet));
        }
        if self.signer.secret_name.trim().is_empty() {
            errors.push("signer.secret_name must be set".to_string());
        }

        if self.api.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("api.listen_addr is not a socket address: {:?}", self.api.listen_addr));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
