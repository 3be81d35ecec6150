//! The sending wallet: one Schnorr key pair and its address on a network

use std::fmt::{Debug, Formatter};

use secp256k1::{Keypair, XOnlyPublicKey};
use zeroize::Zeroizing;

use crate::{
    address::{public_key_address, Address},
    errors::KeyManagementError,
    network::NetworkId,
    signing::{
        keys::{generate_keypair, parse_private_key_hex, private_key_hex},
        signer::Signer,
    },
};

pub mod builder;
pub mod send;

pub use builder::{WalletBuildError, WalletBuilder};
pub use send::{PreparedTransaction, SendOutcome, TransactionSender};

pub struct Wallet {
    keypair: Keypair,
    address: Address,
    network: NetworkId,
    label: Option<String>,
}

impl Wallet {
    pub fn new(keypair: Keypair, network: NetworkId) -> Self {
        let address = public_key_address(network.prefix(), &keypair.x_only_public_key().0);
        Self {
            keypair,
            address,
            network,
            label: None,
        }
    }

    /// Generate a wallet with a fresh random key
    pub fn generate_new(network: NetworkId) -> Self {
        Self::new(generate_keypair(), network)
    }

    pub fn from_private_key_hex(
        private_key_hex: &str,
        network: NetworkId,
    ) -> Result<Self, KeyManagementError> {
        Ok(Self::new(parse_private_key_hex(private_key_hex)?, network))
    }

    /// Pay-to-pubkey address of the wallet key
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn public_key(&self) -> XOnlyPublicKey {
        self.keypair.x_only_public_key().0
    }

    pub fn signer(&self) -> Signer {
        Signer::new(self.keypair)
    }

    /// Hex form of the private key
    pub fn export_private_key(&self) -> Zeroizing<String> {
        private_key_hex(&self.keypair)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

impl Debug for Wallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address.to_string())
            .field("network", &self.network)
            .field("label", &self.label)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
