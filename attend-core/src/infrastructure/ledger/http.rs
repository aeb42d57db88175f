use super::{LedgerClient, TxStatusStream};
use crate::domain::{CostEstimate, Milestone, MintCall, SignedTransaction, TxStatusUpdate};
use crate::foundation::{EventId, PipelineError, TxHash, WalletAddress};
use crate::infrastructure::config::LedgerConfig;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use log::{debug, warn};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JSON client for the ledger gateway sitting in front of the node.
#[derive(Clone)]
pub struct HttpLedgerGateway {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    payload: String,
    signature: String,
    signer: &'a WalletAddress,
}

#[derive(Deserialize)]
struct SubmitResponse {
    tx_hash: TxHash,
}

#[derive(Deserialize)]
struct AttendanceResponse {
    attended: bool,
}

impl HttpLedgerGateway {
    pub fn new(config: &LedgerConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| PipelineError::ConfigError(format!("ledger http client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.status_poll_interval_ms.max(1)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// `None` while the gateway does not know the transaction yet.
async fn fetch_status(client: &reqwest::Client, url: &str) -> Result<Option<TxStatusUpdate>, PipelineError> {
    let response = client.get(url).send().await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let response = ensure_success("tx_status", response, |details| PipelineError::ledger("tx_status", details)).await?;
    Ok(Some(response.json().await?))
}

/// Turns non-2xx responses into errors: 5xx is transient, anything else goes through `rejected`.
async fn ensure_success(
    operation: &str,
    response: Response,
    rejected: impl FnOnce(String) -> PipelineError,
) -> Result<Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let details = format!("{operation} status={} body={}", status.as_u16(), body.trim());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(PipelineError::NetworkError(details))
    } else {
        Err(rejected(details))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerGateway {
    async fn estimate_cost(&self, call: &MintCall) -> Result<CostEstimate, PipelineError> {
        let response = self.client.post(self.url("/v1/estimate")).json(call).send().await?;
        let response = ensure_success("estimate", response, PipelineError::GasEstimationFailed).await?;
        Ok(response.json().await?)
    }

    async fn submit_signed(&self, tx: &SignedTransaction) -> Result<TxHash, PipelineError> {
        let body = SubmitRequest { payload: hex::encode(&tx.payload), signature: hex::encode(&tx.signature), signer: &tx.signer };
        let response = self.client.post(self.url("/v1/submit")).json(&body).send().await?;
        let response = ensure_success("submit", response, PipelineError::SubmissionRejected).await?;
        let submitted: SubmitResponse = response.json().await?;
        debug!("gateway accepted transaction tx_hash={:#x}", submitted.tx_hash);
        Ok(submitted.tx_hash)
    }

    /// Polls the gateway and yields each milestone once, in order, ending after finality.
    async fn subscribe_status(&self, tx_hash: &TxHash) -> Result<TxStatusStream, PipelineError> {
        let url = self.url(&format!("/v1/tx/{:#x}/status", tx_hash));
        let client = self.client.clone();
        let interval = self.poll_interval;
        let tx_hash = *tx_hash;

        struct Poll {
            client: reqwest::Client,
            url: String,
            last: Option<Milestone>,
            first: bool,
            done: bool,
        }

        let state = Poll { client, url, last: None, first: true, done: false };
        let stream = stream::unfold(state, move |mut state| async move {
            if state.done {
                return None;
            }
            loop {
                if !state.first {
                    tokio::time::sleep(interval).await;
                }
                state.first = false;
                match fetch_status(&state.client, &state.url).await {
                    Ok(Some(update)) => {
                        let milestone = update.milestone();
                        if state.last.is_some_and(|last| milestone <= last) {
                            continue;
                        }
                        state.last = Some(milestone);
                        state.done = milestone == Milestone::Finalized;
                        return Some((Ok(update), state));
                    }
                    Ok(None) => continue,
                    Err(err) => {
                        warn!("tx status poll failed tx_hash={:#x} error={}", tx_hash, err);
                        return Some((Err(err), state));
                    }
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn has_attended(&self, event_id: &EventId, wallet: &WalletAddress) -> Result<bool, PipelineError> {
        let response = self
            .client
            .get(self.url("/v1/attendance"))
            .query(&[("event_id", event_id.as_str()), ("wallet", wallet.as_str())])
            .send()
            .await?;
        let response = ensure_success("attendance", response, |details| PipelineError::ledger("has_attended", details)).await?;
        let body: AttendanceResponse = response.json().await?;
        Ok(body.attended)
    }
}
