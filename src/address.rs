//! Addresses bound to a network prefix
//!
//! Encoding and checksums come from `kaspa_addresses`. This module adds the
//! network check the sender needs: an address is only accepted for the
//! network the wallet is configured for.

use secp256k1::XOnlyPublicKey;

use crate::errors::AddressError;

pub use kaspa_addresses::{Address, Prefix, Version};

/// Decode an address that must belong to the `expected` network
pub fn parse_address(s: &str, expected: Prefix) -> Result<Address, AddressError> {
    let address = Address::try_from(s.trim())?;
    if address.prefix != expected {
        return Err(AddressError::PrefixMismatch {
            expected: expected.to_string(),
            actual: address.prefix.to_string(),
        });
    }
    Ok(address)
}

/// Pay-to-pubkey address of a Schnorr public key
pub fn public_key_address(prefix: Prefix, public_key: &XOnlyPublicKey) -> Address {
    Address::new(prefix, Version::PubKey, &public_key.serialize())
}
