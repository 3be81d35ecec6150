//! Single-recipient payment sender for Kaspa
//!
//! This crate builds, signs and submits a transaction that pays one
//! recipient from the unspent outputs of a single Schnorr key.
//!
//! ## Features
//!
//! - `http`: Enables the reqwest client for a node's REST API
//! - `cli`: Enables logging setup and the `kaspa_tx_sender` binary
//!
//! ## Pipeline
//!
//! ```text
//! UtxoSource -> MaturityFilter -> InputSelector -> TransactionBuilder -> Signer -> TransactionSubmitter
//! ```
//!
//! [`wallet::TransactionSender`] runs the whole pipeline. Each stage can
//! also be used on its own.

pub mod address;
pub mod config;
pub mod data_structures;
pub mod errors;
pub mod hex_utils;
#[cfg(feature = "cli")]
pub mod logging;
pub mod network;
pub mod rpc;
pub mod signing;
pub mod wallet;

pub use address::{Address, Prefix};
pub use config::SenderConfig;
pub use errors::*;
pub use network::NetworkId;
pub use wallet::{SendOutcome, TransactionSender, Wallet, WalletBuilder};
