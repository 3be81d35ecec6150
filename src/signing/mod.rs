//! Preparing and signing transactions
//!
//! [`prepare`] turns the wallet's unspent outputs into an unsigned
//! transaction. [`signer`] fills in one Schnorr signature script per input.

pub mod keys;
pub mod prepare;
pub mod signer;

pub use signer::{parse_signature_script, verify_all_inputs, verify_input, Signer};
