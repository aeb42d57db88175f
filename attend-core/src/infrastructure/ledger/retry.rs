use crate::domain::job::exponential_delay_ms;
use crate::foundation::PipelineError;
use crate::infrastructure::config::TransportRetryConfig;
use log::warn;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async ledger call while it fails with a transient (transport) error.
///
/// Definitive answers from the ledger are returned immediately. This budget is independent of
/// the mint attempt counter on the job.
pub async fn retry_transient<F, Fut, T>(operation: &str, policy: &TransportRetryConfig, mut op: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay_ms = exponential_delay_ms(attempt, policy.base_delay_ms, policy.max_delay_ms);
                warn!(
                    "ledger call failed; retrying operation={} attempt={} max_attempts={} delay_ms={} error={}",
                    operation, attempt, attempts, delay_ms, err
                );
                sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
