//! Configuration of a send attempt

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SenderError, SenderResult},
    network::{normalize_rpc_server_address, NetworkId},
    signing::prepare::{DEFAULT_MAX_INPUTS, MIN_CONFIRMATIONS},
};

/// Flat fee paid by every transaction, in sompi
pub const DEFAULT_FEE: u64 = 100_000;
/// Amount sent when none is given, in sompi
pub const DEFAULT_SEND_AMOUNT: u64 = 10_000_000;
/// Time allowed for each call to the node
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub network: NetworkId,
    /// Node REST address. Empty means localhost on the default REST port.
    pub rpc_server: String,
    /// Fee in sompi
    pub fee: u64,
    /// Maximum number of inputs per transaction
    pub max_inputs: usize,
    pub min_confirmations: u64,
    pub request_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::default(),
            rpc_server: String::new(),
            fee: DEFAULT_FEE,
            max_inputs: DEFAULT_MAX_INPUTS,
            min_confirmations: MIN_CONFIRMATIONS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SenderConfig {
    pub fn new(network: NetworkId) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn with_rpc_server<S: Into<String>>(mut self, rpc_server: S) -> Self {
        self.rpc_server = rpc_server.into();
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs;
        self
    }

    pub fn with_min_confirmations(mut self, min_confirmations: u64) -> Self {
        self.min_confirmations = min_confirmations;
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// RPC server address with host and port filled in
    pub fn rpc_server_address(&self) -> SenderResult<String> {
        normalize_rpc_server_address(&self.rpc_server)
    }

    pub fn validate(&self) -> SenderResult<()> {
        if self.fee == 0 {
            return Err(SenderError::ConfigurationError(
                "fee must be greater than zero".to_string(),
            ));
        }
        if self.max_inputs == 0 {
            return Err(SenderError::ConfigurationError(
                "max_inputs must be greater than zero".to_string(),
            ));
        }
        if self.min_confirmations >= self.network.coinbase_maturity() {
            return Err(SenderError::ConfigurationError(format!(
                "min_confirmations ({}) must be below the coinbase maturity ({})",
                self.min_confirmations,
                self.network.coinbase_maturity()
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(SenderError::ConfigurationError(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SenderConfig::default();
        assert_eq!(config.network, NetworkId::Testnet);
        assert_eq!(config.fee, 100_000);
        assert_eq!(config.max_inputs, 100);
        assert_eq!(config.min_confirmations, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_server_address().unwrap(), "localhost:8000");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SenderConfig::default().with_fee(0).validate().is_err());
        assert!(SenderConfig::default().with_max_inputs(0).validate().is_err());
        assert!(SenderConfig::default()
            .with_min_confirmations(100)
            .validate()
            .is_err());
        assert!(SenderConfig::default()
            .with_request_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SenderConfig =
            serde_json::from_str(r#"{"network": "mainnet", "fee": 2000}"#).unwrap();
        assert_eq!(config.network, NetworkId::Mainnet);
        assert_eq!(config.fee, 2_000);
        assert_eq!(config.max_inputs, DEFAULT_MAX_INPUTS);
    }
}
