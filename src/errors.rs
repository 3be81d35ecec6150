//! Error types for the transaction sender
//!
//! Every pipeline stage has its own error enum. They all convert into the
//! top-level [`SenderError`], which also records the stage a transport
//! failure happened in so callers can tell "no coins", "not enough coins",
//! "build failed" and "rejected by the network" apart.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

use crate::hex_utils::HexError;

/// Result alias used across the crate
pub type SenderResult<T> = Result<T, SenderError>;

/// The stage of a send attempt an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendStage {
    FetchUtxos,
    FetchConfirmationScore,
    Selection,
    Build,
    Sign,
    Submit,
}

impl Display for SendStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SendStage::FetchUtxos => "fetching unspent outputs",
            SendStage::FetchConfirmationScore => "fetching the confirmation score",
            SendStage::Selection => "selecting inputs",
            SendStage::Build => "building the transaction",
            SendStage::Sign => "signing the transaction",
            SendStage::Submit => "submitting the transaction",
        };
        f.write_str(label)
    }
}

/// Top-level error for a send attempt
#[derive(Debug, Error)]
pub enum SenderError {
    #[error("Address error: {0}")]
    AddressError(#[from] AddressError),

    #[error("Key management error: {0}")]
    KeyManagementError(#[from] KeyManagementError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Transport error while {stage}: {source}")]
    Transport {
        stage: SendStage,
        #[source]
        source: TransportError,
    },

    #[error("Timed out after {timeout:?} while {stage}")]
    Timeout { stage: SendStage, timeout: Duration },

    #[error("No spendable outputs available for {address}")]
    NoSpendableOutputs { address: String },

    #[error(
        "Insufficient funds: selected {selected} sompi across {inputs} inputs, required {required} sompi"
    )]
    InsufficientFunds {
        selected: u64,
        required: u64,
        inputs: usize,
    },

    #[error("Failed to build transaction: {0}")]
    BuildError(#[from] BuildError),

    #[error("Failed to sign transaction: {0}")]
    SigningError(#[from] SigningError),

    #[error("Send cancelled while {stage}")]
    Cancelled { stage: SendStage },

    #[error("Logging setup failed: {0}")]
    LoggingError(String),
}

impl SenderError {
    /// Wrap a transport failure with the stage it happened in
    pub fn transport(stage: SendStage, source: TransportError) -> Self {
        SenderError::Transport { stage, source }
    }

    /// The pipeline stage this error belongs to, if it came from one
    pub fn stage(&self) -> Option<SendStage> {
        match self {
            SenderError::Transport { stage, .. }
            | SenderError::Timeout { stage, .. }
            | SenderError::Cancelled { stage } => Some(*stage),
            SenderError::NoSpendableOutputs { .. } | SenderError::InsufficientFunds { .. } => {
                Some(SendStage::Selection)
            }
            SenderError::BuildError(_) => Some(SendStage::Build),
            SenderError::SigningError(_) => Some(SendStage::Sign),
            SenderError::AddressError(_)
            | SenderError::KeyManagementError(_)
            | SenderError::ConfigurationError(_)
            | SenderError::LoggingError(_) => None,
        }
    }

    /// True when the node refused the signed transaction
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SenderError::Transport {
                stage: SendStage::Submit,
                source: TransportError::Rejected(_),
            }
        )
    }

    /// True for both the empty and the short selection cases
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            SenderError::NoSpendableOutputs { .. } | SenderError::InsufficientFunds { .. }
        )
    }
}

/// Address decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid address: {0}")]
    Invalid(String),

    #[error("Address prefix mismatch: expected '{expected}', got '{actual}'")]
    PrefixMismatch { expected: String, actual: String },
}

impl From<kaspa_addresses::AddressError> for AddressError {
    fn from(err: kaspa_addresses::AddressError) -> Self {
        AddressError::Invalid(err.to_string())
    }
}

/// Private key parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyManagementError {
    #[error("Invalid private key hex: {0}")]
    InvalidHex(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

impl KeyManagementError {
    pub fn invalid_private_key(reason: &str) -> Self {
        KeyManagementError::InvalidPrivateKey(reason.to_string())
    }
}

impl From<HexError> for KeyManagementError {
    fn from(err: HexError) -> Self {
        KeyManagementError::InvalidHex(err.to_string())
    }
}

/// Failures reported by the UTXO query and submission collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn connection_failed(reason: &str) -> Self {
        TransportError::ConnectionFailed(reason.to_string())
    }

    pub fn request_failed(reason: &str) -> Self {
        TransportError::RequestFailed(reason.to_string())
    }

    pub fn invalid_response(reason: &str) -> Self {
        TransportError::InvalidResponse(reason.to_string())
    }
}

/// Transaction assembly errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No inputs were selected")]
    NoInputs,

    #[error("Malformed outpoint transaction id on input {index}: {reason}")]
    MalformedOutpoint { index: usize, reason: String },

    #[error("Malformed locking script on input {index}: {reason}")]
    MalformedScript { index: usize, reason: String },

    #[error("Address is for network '{actual}' but the transaction is for '{expected}'")]
    NetworkMismatch { expected: String, actual: String },

    #[error("Outputs ({outputs} sompi) exceed inputs ({inputs} sompi)")]
    OutputsExceedInputs { inputs: u64, outputs: u64 },
}

/// Signing and signature verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Input index {index} out of range for a transaction with {count} inputs")]
    InputIndexOutOfRange { index: usize, count: usize },

    #[error("Input {index} has no spent output attached")]
    MissingUtxoEntry { index: usize },

    #[error("Input {index} is not locked to a Schnorr pay-to-pubkey script")]
    UnsupportedScript { index: usize },

    #[error("Input {index} is locked to a different public key")]
    ForeignInput { index: usize },

    #[error("Input {index} has no valid signature script")]
    MissingSignature { index: usize },

    #[error("Signature verification failed for input {index}")]
    VerificationFailed { index: usize },

    #[error("Cryptographic failure: {0}")]
    Crypto(String),
}
