//! Hex helpers for fixed-size byte values

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl From<hex::FromHexError> for HexError {
    fn from(err: hex::FromHexError) -> Self {
        HexError::InvalidHex(err.to_string())
    }
}

/// Decode a hex string into exactly `N` bytes
pub fn decode_fixed<const N: usize>(hex: &str) -> Result<[u8; N], HexError> {
    let bytes = hex::decode(hex.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| HexError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })
}
