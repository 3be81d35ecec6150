//! Ledger types and value helpers
//!
//! Transactions, outpoints and spent-output entries are the consensus
//! types from `kaspa_consensus_core`, so ids and signature hashes follow the
//! ledger's own encoding. A transaction travels through signing as a
//! [`SignableTransaction`]: the transaction plus the entry of every output
//! it spends.

pub use kaspa_consensus_core::{
    constants::TX_VERSION,
    subnets::{SubnetworkId, SUBNETWORK_ID_NATIVE},
    tx::{
        ScriptPublicKey, SignableTransaction, Transaction, TransactionId, TransactionInput,
        TransactionOutpoint, TransactionOutput, UtxoEntry,
    },
};

/// Atomic value units per KAS
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Unsigned value transfer on the native subnetwork
pub fn native_transaction(
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
) -> Transaction {
    Transaction::new(
        TX_VERSION,
        inputs,
        outputs,
        0,
        SUBNETWORK_ID_NATIVE,
        0,
        Vec::new(),
    )
}

/// Input spending `outpoint` with one signature operation and an empty
/// signature script
pub fn unsigned_input(outpoint: TransactionOutpoint) -> TransactionInput {
    TransactionInput::new(outpoint, Vec::new(), 0, 1)
}

/// Value totals of a transaction whose spent outputs are known
pub trait TransactionValues {
    /// Sum of the spent outputs, `None` on overflow or a missing entry
    fn total_input_value(&self) -> Option<u64>;

    /// Sum of the created outputs, `None` on overflow
    fn total_output_value(&self) -> Option<u64>;

    /// The implicit fee, `None` if outputs exceed inputs
    fn fee(&self) -> Option<u64> {
        self.total_input_value()?
            .checked_sub(self.total_output_value()?)
    }

    fn is_fully_signed(&self) -> bool;
}

impl TransactionValues for SignableTransaction {
    fn total_input_value(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, entry| acc.checked_add(entry.as_ref()?.amount))
    }

    fn total_output_value(&self) -> Option<u64> {
        self.tx
            .outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }

    fn is_fully_signed(&self) -> bool {
        self.tx
            .inputs
            .iter()
            .all(|input| !input.signature_script.is_empty())
    }
}

/// Format a sompi amount as KAS with eight decimals
pub fn format_kaspa(sompi: u64) -> String {
    format!(
        "{}.{:08}",
        sompi / SOMPI_PER_KASPA,
        sompi % SOMPI_PER_KASPA
    )
}
