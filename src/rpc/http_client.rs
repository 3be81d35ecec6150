//! HTTP implementation of the node collaborators
//!
//! Talks to a node's REST interface:
//!
//! - `GET  {base}/addresses/{address}/utxos` for unspent outputs
//! - `GET  {base}/info/blockdag` for the virtual DAA score
//! - `POST {base}/transactions` to submit a signed transaction
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use kaspa_tx_sender::rpc::{HttpRpcClient, UtxoSource};
//!
//! async fn current_score() -> Result<u64, Box<dyn std::error::Error>> {
//!     let client = HttpRpcClient::connect("http://127.0.0.1:8000", Duration::from_secs(30)).await?;
//!     Ok(client.get_current_confirmation_score().await?)
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    address::Address,
    errors::TransportError,
    rpc::{
        types::{
            BlockDagInfoResponse, RpcTransaction, SubmitTransactionRequest,
            SubmitTransactionResponse, UnspentOutput,
        },
        TransactionSubmitter, UtxoSource,
    },
};

/// HTTP client for a node's REST API
#[derive(Debug, Clone)]
pub struct HttpRpcClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRpcClient {
    /// Create a client without contacting the node. A missing scheme
    /// defaults to `http://`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TransportError::connection_failed(&format!("Failed to create HTTP client: {e}"))
            })?;

        let base_url = base_url.trim().trim_end_matches('/');
        let base_url = if base_url.contains("://") {
            base_url.to_string()
        } else {
            format!("http://{base_url}")
        };

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Create a client and check that the node answers
    pub async fn connect(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Self::new(base_url, timeout)?;
        client
            .get_json::<BlockDagInfoResponse>(&client.endpoint("info/blockdag"))
            .await
            .map_err(|e| {
                TransportError::connection_failed(&format!(
                    "Failed to connect to {}: {e}",
                    client.base_url
                ))
            })?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::request_failed(&format!(
                "HTTP {status} from {url}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::invalid_response(&e.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::connection_failed(&err.to_string())
    } else if err.is_decode() {
        TransportError::invalid_response(&err.to_string())
    } else {
        TransportError::request_failed(&err.to_string())
    }
}

#[async_trait]
impl UtxoSource for HttpRpcClient {
    async fn get_unspent_outputs(
        &self,
        address: &Address,
    ) -> Result<Vec<UnspentOutput>, TransportError> {
        let url = self.endpoint(&format!("addresses/{address}/utxos"));
        let outputs: Vec<UnspentOutput> = self.get_json(&url).await?;
        debug!("Node reported {} unspent outputs for {}", outputs.len(), address);
        Ok(outputs)
    }

    async fn get_current_confirmation_score(&self) -> Result<u64, TransportError> {
        let info: BlockDagInfoResponse = self.get_json(&self.endpoint("info/blockdag")).await?;
        Ok(info.virtual_daa_score)
    }
}

#[async_trait]
impl TransactionSubmitter for HttpRpcClient {
    async fn submit(&self, transaction: &RpcTransaction) -> Result<String, TransportError> {
        let url = self.endpoint("transactions");
        debug!("POST {}", url);
        let request = SubmitTransactionRequest {
            transaction,
            allow_orphan: false,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::invalid_response(&e.to_string()))?;

        // Rejections come back as 4xx with an error message in the body
        if status.is_client_error() {
            let message = serde_json::from_str::<SubmitTransactionResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(TransportError::Rejected(message));
        }
        if !status.is_success() {
            return Err(TransportError::request_failed(&format!(
                "HTTP {status} from {url}: {body}"
            )));
        }

        let parsed: SubmitTransactionResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::invalid_response(&e.to_string()))?;
        match (parsed.transaction_id, parsed.error) {
            (_, Some(error)) => Err(TransportError::Rejected(error)),
            (Some(id), None) => Ok(id),
            (None, None) => Err(TransportError::invalid_response(
                "Submission response has neither a transaction id nor an error",
            )),
        }
    }
}
