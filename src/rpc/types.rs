//! Wire types exchanged with the node's RPC interface
//!
//! Identifiers, scripts and payloads travel as hex strings. Numeric fields
//! are accepted either as JSON numbers or as decimal strings, since public
//! endpoints commonly encode u64 values as strings.

use serde::{Deserialize, Serialize};

use crate::{
    data_structures::{
        ScriptPublicKey, SubnetworkId, Transaction, TransactionId, TransactionInput,
        TransactionOutpoint, TransactionOutput,
    },
    hex_utils::{decode_fixed, HexError},
};

pub(crate) mod u64_string_or_number {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcOutpoint {
    pub transaction_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcScriptPublicKey {
    #[serde(default)]
    pub version: u16,
    #[serde(rename = "scriptPublicKey", alias = "script")]
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcUtxoEntry {
    #[serde(with = "u64_string_or_number")]
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
    #[serde(with = "u64_string_or_number")]
    pub block_daa_score: u64,
    #[serde(default)]
    pub is_coinbase: bool,
}

/// An unspent output as reported by the UTXO query service.
///
/// Kept in wire form: the transaction id and locking script are decoded
/// only when the output is turned into a transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub outpoint: RpcOutpoint,
    pub utxo_entry: RpcUtxoEntry,
}

impl UnspentOutput {
    pub fn amount(&self) -> u64 {
        self.utxo_entry.amount
    }

    pub fn is_coinbase(&self) -> bool {
        self.utxo_entry.is_coinbase
    }

    /// Confirmation score of the block that created this output
    pub fn block_daa_score(&self) -> u64 {
        self.utxo_entry.block_daa_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionInput {
    pub previous_outpoint: RpcOutpoint,
    pub signature_script: String,
    pub sequence: u64,
    pub sig_op_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionOutput {
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
}

/// Signed transaction in the form the submission endpoint accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub version: u16,
    pub inputs: Vec<RpcTransactionInput>,
    pub outputs: Vec<RpcTransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: String,
    pub gas: u64,
    pub payload: String,
}

impl From<&TransactionInput> for RpcTransactionInput {
    fn from(input: &TransactionInput) -> Self {
        Self {
            previous_outpoint: RpcOutpoint {
                transaction_id: input.previous_outpoint.transaction_id.to_string(),
                index: input.previous_outpoint.index,
            },
            signature_script: hex::encode(&input.signature_script),
            sequence: input.sequence,
            sig_op_count: input.sig_op_count,
        }
    }
}

impl From<&TransactionOutput> for RpcTransactionOutput {
    fn from(output: &TransactionOutput) -> Self {
        Self {
            amount: output.value,
            script_public_key: RpcScriptPublicKey {
                version: output.script_public_key.version(),
                script: hex::encode(output.script_public_key.script()),
            },
        }
    }
}

impl From<&Transaction> for RpcTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            version: tx.version,
            inputs: tx.inputs.iter().map(RpcTransactionInput::from).collect(),
            outputs: tx.outputs.iter().map(RpcTransactionOutput::from).collect(),
            lock_time: tx.lock_time,
            subnetwork_id: tx.subnetwork_id.to_string(),
            gas: tx.gas,
            payload: hex::encode(&tx.payload),
        }
    }
}

impl TryFrom<&RpcTransaction> for Transaction {
    type Error = HexError;

    fn try_from(rpc: &RpcTransaction) -> Result<Self, Self::Error> {
        let inputs = rpc
            .inputs
            .iter()
            .map(|input| {
                let outpoint = TransactionOutpoint::new(
                    TransactionId::from_bytes(decode_fixed(&input.previous_outpoint.transaction_id)?),
                    input.previous_outpoint.index,
                );
                Ok(TransactionInput::new(
                    outpoint,
                    hex::decode(&input.signature_script)?,
                    input.sequence,
                    input.sig_op_count,
                ))
            })
            .collect::<Result<Vec<_>, HexError>>()?;
        let outputs = rpc
            .outputs
            .iter()
            .map(|output| {
                Ok(TransactionOutput::new(
                    output.amount,
                    ScriptPublicKey::from_vec(
                        output.script_public_key.version,
                        hex::decode(&output.script_public_key.script)?,
                    ),
                ))
            })
            .collect::<Result<Vec<_>, HexError>>()?;

        Ok(Transaction::new(
            rpc.version,
            inputs,
            outputs,
            rpc.lock_time,
            SubnetworkId::from_bytes(decode_fixed(&rpc.subnetwork_id)?),
            rpc.gas,
            hex::decode(&rpc.payload)?,
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionRequest<'a> {
    pub transaction: &'a RpcTransaction,
    pub allow_orphan: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDagInfoResponse {
    #[serde(with = "u64_string_or_number")]
    pub virtual_daa_score: u64,
}
