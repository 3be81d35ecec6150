//! Fluent construction of a [`Wallet`]

use secp256k1::Keypair;
use zeroize::Zeroizing;

use crate::errors::{KeyManagementError, SenderError};
use crate::network::NetworkId;
use crate::wallet::Wallet;

/// Errors that can occur during wallet building
#[derive(Debug, Clone)]
pub enum WalletBuildError {
    /// The key material could not be turned into a wallet
    WalletCreation(String),
    /// Missing required parameters
    MissingParameter(String),
}

impl std::fmt::Display for WalletBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletBuildError::WalletCreation(msg) => write!(f, "Wallet creation error: {}", msg),
            WalletBuildError::MissingParameter(param) => {
                write!(f, "Missing required parameter: {}", param)
            }
        }
    }
}

impl std::error::Error for WalletBuildError {}

impl From<KeyManagementError> for WalletBuildError {
    fn from(err: KeyManagementError) -> Self {
        WalletBuildError::WalletCreation(err.to_string())
    }
}

impl From<WalletBuildError> for SenderError {
    fn from(err: WalletBuildError) -> Self {
        SenderError::ConfigurationError(err.to_string())
    }
}

enum WalletCreationMethod {
    GenerateNew,
    FromPrivateKeyHex(Zeroizing<String>),
    FromKeypair(Keypair),
}

/// Builder for [`Wallet`]
///
/// ```rust
/// use kaspa_tx_sender::{network::NetworkId, wallet::WalletBuilder};
///
/// let wallet = WalletBuilder::new()
///     .generate_new()
///     .with_network(NetworkId::Simnet)
///     .with_label("faucet")
///     .build()
///     .unwrap();
/// assert!(wallet.address().to_string().starts_with("kaspasim:"));
/// ```
pub struct WalletBuilder {
    creation_method: Option<WalletCreationMethod>,
    network: NetworkId,
    label: Option<String>,
}

impl WalletBuilder {
    /// A builder for the default network with no key source chosen yet
    pub fn new() -> Self {
        Self {
            creation_method: None,
            network: NetworkId::default(),
            label: None,
        }
    }

    pub fn generate_new(mut self) -> Self {
        self.creation_method = Some(WalletCreationMethod::GenerateNew);
        self
    }

    /// Use a 64-character hex private key
    pub fn from_private_key_hex<S: Into<String>>(mut self, private_key_hex: S) -> Self {
        self.creation_method = Some(WalletCreationMethod::FromPrivateKeyHex(Zeroizing::new(
            private_key_hex.into(),
        )));
        self
    }

    pub fn from_keypair(mut self, keypair: Keypair) -> Self {
        self.creation_method = Some(WalletCreationMethod::FromKeypair(keypair));
        self
    }

    pub fn with_network(mut self, network: NetworkId) -> Self {
        self.network = network;
        self
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build the wallet
    ///
    /// # Errors
    ///
    /// * `MissingParameter` - If no key source was specified
    /// * `WalletCreation` - If the private key is invalid
    pub fn build(self) -> Result<Wallet, WalletBuildError> {
        let creation_method = self.creation_method.ok_or_else(|| {
            WalletBuildError::MissingParameter(
                "key source (call generate_new, from_private_key_hex or from_keypair)".to_string(),
            )
        })?;

        let mut wallet = match creation_method {
            WalletCreationMethod::GenerateNew => Wallet::generate_new(self.network),
            WalletCreationMethod::FromPrivateKeyHex(hex) => {
                Wallet::from_private_key_hex(hex.trim(), self.network)?
            }
            WalletCreationMethod::FromKeypair(keypair) => Wallet::new(keypair, self.network),
        };
        wallet.set_label(self.label);

        Ok(wallet)
    }
}

impl Default for WalletBuilder {
    fn default() -> Self {
        Self::new()
    }
}
