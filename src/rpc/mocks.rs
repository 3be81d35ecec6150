//! In-memory node for deterministic testing
//!
//! [`MockRpcClient`] implements both [`UtxoSource`] and
//! [`TransactionSubmitter`] without any network access. Failures and delays
//! can be injected per operation through [`MockFailureModes`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kaspa_txscript::pay_to_address_script;

use crate::{
    address::Address,
    data_structures::{Transaction, TransactionId},
    errors::TransportError,
    rpc::{
        types::{RpcOutpoint, RpcScriptPublicKey, RpcTransaction, RpcUtxoEntry, UnspentOutput},
        TransactionSubmitter, UtxoSource,
    },
};

/// Mock node holding a fixed UTXO set and confirmation score
#[derive(Debug, Clone)]
pub struct MockRpcClient {
    /// Outputs returned by every UTXO query, in this order
    utxos: Arc<Mutex<Vec<UnspentOutput>>>,
    /// Current virtual DAA score
    confirmation_score: Arc<Mutex<u64>>,
    /// Every transaction passed to `submit`, accepted or not
    submitted: Arc<Mutex<Vec<RpcTransaction>>>,
    /// Id the node reports for an accepted submission. Defaults to the id
    /// of the submitted transaction.
    next_transaction_id: Arc<Mutex<Option<String>>>,
    utxo_queries: Arc<Mutex<usize>>,
    /// Simulated failure modes for testing error conditions
    failure_modes: Arc<Mutex<MockFailureModes>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockFailureModes {
    /// Fail the next UTXO query
    pub fail_get_utxos: bool,
    /// Fail the next confirmation score query
    pub fail_get_score: bool,
    /// Fail the next submission with a transport error
    pub fail_submit: bool,
    /// Reject every submission with this message
    pub reject_message: Option<String>,
    /// Sleep this long before answering any call
    pub simulate_delay: Option<Duration>,
}

impl Default for MockRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self {
            utxos: Arc::new(Mutex::new(Vec::new())),
            confirmation_score: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
            next_transaction_id: Arc::new(Mutex::new(None)),
            utxo_queries: Arc::new(Mutex::new(0)),
            failure_modes: Arc::new(Mutex::new(MockFailureModes::default())),
        }
    }

    /// Create a mock node with the given outputs and score
    pub fn with_utxos(utxos: Vec<UnspentOutput>, confirmation_score: u64) -> Self {
        let mock = Self::new();
        mock.set_utxos(utxos);
        mock.set_confirmation_score(confirmation_score);
        mock
    }

    pub fn set_utxos(&self, utxos: Vec<UnspentOutput>) {
        *self.utxos.lock().unwrap() = utxos;
    }

    pub fn add_utxo(&self, utxo: UnspentOutput) {
        self.utxos.lock().unwrap().push(utxo);
    }

    pub fn set_confirmation_score(&self, score: u64) {
        *self.confirmation_score.lock().unwrap() = score;
    }

    /// Fix the id returned for the next accepted submissions
    pub fn set_next_transaction_id(&self, id: &str) {
        *self.next_transaction_id.lock().unwrap() = Some(id.to_string());
    }

    /// Set failure mode for testing error conditions
    pub fn set_failure_mode(&self, mode: MockFailureModes) {
        *self.failure_modes.lock().unwrap() = mode;
    }

    pub fn get_failure_modes(&self) -> MockFailureModes {
        self.failure_modes.lock().unwrap().clone()
    }

    /// Transactions received by `submit`
    pub fn submitted_transactions(&self) -> Vec<RpcTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn utxo_query_count(&self) -> usize {
        *self.utxo_queries.lock().unwrap()
    }

    /// Reset the mock to an empty node
    pub fn reset(&self) {
        self.utxos.lock().unwrap().clear();
        *self.confirmation_score.lock().unwrap() = 0;
        self.submitted.lock().unwrap().clear();
        *self.next_transaction_id.lock().unwrap() = None;
        *self.utxo_queries.lock().unwrap() = 0;
        *self.failure_modes.lock().unwrap() = MockFailureModes::default();
    }

    async fn maybe_delay(&self) {
        let delay = self.failure_modes.lock().unwrap().simulate_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Check if an operation should fail. One-shot flags are cleared once used.
    fn check_failure(&self, operation: &str) -> Result<(), TransportError> {
        let mut modes = self.failure_modes.lock().unwrap();
        match operation {
            "get_utxos" if modes.fail_get_utxos => {
                modes.fail_get_utxos = false;
                Err(TransportError::connection_failed(
                    "Mock failure: get_unspent_outputs",
                ))
            }
            "get_score" if modes.fail_get_score => {
                modes.fail_get_score = false;
                Err(TransportError::request_failed(
                    "Mock failure: get_current_confirmation_score",
                ))
            }
            "submit" if modes.fail_submit => {
                modes.fail_submit = false;
                Err(TransportError::connection_failed("Mock failure: submit"))
            }
            "submit" => match &modes.reject_message {
                Some(message) => Err(TransportError::Rejected(message.clone())),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UtxoSource for MockRpcClient {
    async fn get_unspent_outputs(
        &self,
        _address: &Address,
    ) -> Result<Vec<UnspentOutput>, TransportError> {
        self.maybe_delay().await;
        *self.utxo_queries.lock().unwrap() += 1;
        self.check_failure("get_utxos")?;
        Ok(self.utxos.lock().unwrap().clone())
    }

    async fn get_current_confirmation_score(&self) -> Result<u64, TransportError> {
        self.maybe_delay().await;
        self.check_failure("get_score")?;
        Ok(*self.confirmation_score.lock().unwrap())
    }
}

#[async_trait]
impl TransactionSubmitter for MockRpcClient {
    async fn submit(&self, transaction: &RpcTransaction) -> Result<String, TransportError> {
        self.maybe_delay().await;
        self.submitted.lock().unwrap().push(transaction.clone());
        self.check_failure("submit")?;

        if let Some(id) = self.next_transaction_id.lock().unwrap().clone() {
            return Ok(id);
        }
        let decoded = Transaction::try_from(transaction)
            .map_err(|e| TransportError::Rejected(format!("malformed transaction: {e}")))?;
        Ok(decoded.id().to_string())
    }
}

/// Build an unspent output locked to `address`.
///
/// The outpoint transaction id is `seed` repeated 32 times.
pub fn mock_unspent_output(
    address: &Address,
    seed: u8,
    index: u32,
    amount: u64,
    block_daa_score: u64,
    is_coinbase: bool,
) -> UnspentOutput {
    let script = pay_to_address_script(address);
    let transaction_id = TransactionId::from_bytes([seed; 32]);
    UnspentOutput {
        address: Some(address.to_string()),
        outpoint: RpcOutpoint {
            transaction_id: transaction_id.to_string(),
            index,
        },
        utxo_entry: RpcUtxoEntry {
            amount,
            script_public_key: RpcScriptPublicKey {
                version: script.version(),
                script: hex::encode(script.script()),
            },
            block_daa_score,
            is_coinbase,
        },
    }
}
