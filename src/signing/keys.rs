//! Private key parsing and generation

use secp256k1::{Keypair, SECP256K1};
use zeroize::Zeroizing;

use crate::{errors::KeyManagementError, hex_utils::decode_fixed};

/// Parse a 64-character hex private key into a Schnorr key pair
pub fn parse_private_key_hex(private_key_hex: &str) -> Result<Keypair, KeyManagementError> {
    let bytes: Zeroizing<[u8; 32]> = Zeroizing::new(decode_fixed(private_key_hex)?);
    Keypair::from_seckey_slice(SECP256K1, &bytes[..])
        .map_err(|e| KeyManagementError::invalid_private_key(&e.to_string()))
}

/// Generate a fresh key pair from the thread-local RNG
pub fn generate_keypair() -> Keypair {
    Keypair::new(SECP256K1, &mut rand::thread_rng())
}

/// Hex form of the secret key, cleared from memory when dropped
pub fn private_key_hex(keypair: &Keypair) -> Zeroizing<String> {
    let secret = Zeroizing::new(keypair.secret_bytes());
    Zeroizing::new(hex::encode(&secret[..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let hex_key = "5352da6a9b87829610211727c253c34eed7f8d39ef4530db6b79e40e844bccd0";
        let keypair = parse_private_key_hex(hex_key).unwrap();
        assert_eq!(private_key_hex(&keypair).as_str(), hex_key);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(matches!(
            parse_private_key_hex("not hex"),
            Err(KeyManagementError::InvalidHex(_))
        ));
        assert!(matches!(
            parse_private_key_hex("abcd"),
            Err(KeyManagementError::InvalidHex(_))
        ));
        // Zero is not a valid secret key
        assert!(matches!(
            parse_private_key_hex(&"00".repeat(32)),
            Err(KeyManagementError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.x_only_public_key().0, b.x_only_public_key().0);
    }
}
