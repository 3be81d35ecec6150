//! Boundary to the node: UTXO queries and transaction submission
//!
//! The send pipeline only talks to the node through the two traits defined
//! here. [`http_client::HttpRpcClient`] implements both against a node's
//! HTTP API; [`mocks::MockRpcClient`] implements both in memory for tests.
//!
//! Transport errors are returned as-is. Retrying is left to the operator,
//! because a transaction built from a stale UTXO snapshot would be refused
//! anyway.

use async_trait::async_trait;

use crate::{address::Address, errors::TransportError};

#[cfg(feature = "http")]
pub mod http_client;
pub mod mocks;
pub mod types;

#[cfg(feature = "http")]
pub use http_client::HttpRpcClient;
pub use types::{RpcTransaction, UnspentOutput};

/// Source of unspent outputs and of the ledger's confirmation score
#[async_trait]
pub trait UtxoSource: Send + Sync {
    /// Unspent outputs locked to `address`, in the order the node reports them
    async fn get_unspent_outputs(
        &self,
        address: &Address,
    ) -> Result<Vec<UnspentOutput>, TransportError>;

    /// The current virtual DAA score
    async fn get_current_confirmation_score(&self) -> Result<u64, TransportError>;
}

/// Relays signed transactions to the network
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit a signed transaction, returning the id the node assigned
    async fn submit(&self, transaction: &RpcTransaction) -> Result<String, TransportError>;
}
