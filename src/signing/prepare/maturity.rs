//! Spendability of unspent outputs at a given confirmation score

use crate::{
    network::{NetworkId, DEFAULT_COINBASE_MATURITY},
    rpc::UnspentOutput,
};

/// Confirmations a regular output needs before it is spent
pub const MIN_CONFIRMATIONS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaturityFilter {
    pub min_confirmations: u64,
    pub coinbase_maturity: u64,
}

impl Default for MaturityFilter {
    fn default() -> Self {
        Self::new(MIN_CONFIRMATIONS, DEFAULT_COINBASE_MATURITY)
    }
}

impl MaturityFilter {
    pub fn new(min_confirmations: u64, coinbase_maturity: u64) -> Self {
        Self {
            min_confirmations,
            coinbase_maturity,
        }
    }

    pub fn for_network(network: NetworkId, min_confirmations: u64) -> Self {
        Self::new(min_confirmations, network.coinbase_maturity())
    }

    /// An output is spendable once its creation score plus the required
    /// window is strictly below the current score. Coinbase outputs use the
    /// coinbase maturity window instead of `min_confirmations`.
    pub fn is_spendable(&self, output: &UnspentOutput, current_score: u64) -> bool {
        let window = if output.is_coinbase() {
            self.coinbase_maturity
        } else {
            self.min_confirmations
        };
        output.block_daa_score().saturating_add(window) < current_score
    }

    /// Keep the spendable outputs, preserving their order
    pub fn filter(&self, outputs: Vec<UnspentOutput>, current_score: u64) -> Vec<UnspentOutput> {
        outputs
            .into_iter()
            .filter(|output| self.is_spendable(output, current_score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::{public_key_address, Address, Prefix},
        rpc::mocks::mock_unspent_output,
        signing::keys::parse_private_key_hex,
    };

    fn address() -> Address {
        let keypair = parse_private_key_hex(&"21".repeat(32)).unwrap();
        public_key_address(Prefix::Testnet, &keypair.x_only_public_key().0)
    }

    #[test]
    fn test_regular_output_boundary() {
        let filter = MaturityFilter::default();
        let output = mock_unspent_output(&address(), 1, 0, 1_000, 500, false);

        // 500 + 10 must be strictly below the score
        assert!(!filter.is_spendable(&output, 509));
        assert!(!filter.is_spendable(&output, 510));
        assert!(filter.is_spendable(&output, 511));
    }

    #[test]
    fn test_coinbase_needs_longer_window() {
        let filter = MaturityFilter::default();
        let coinbase = mock_unspent_output(&address(), 2, 0, 1_000, 500, true);
        let regular = mock_unspent_output(&address(), 3, 0, 1_000, 500, false);

        assert!(filter.is_spendable(&regular, 550));
        assert!(!filter.is_spendable(&coinbase, 550));
        assert!(!filter.is_spendable(&coinbase, 600));
        assert!(filter.is_spendable(&coinbase, 601));
    }

    #[test]
    fn test_no_wraparound_near_max_score() {
        let filter = MaturityFilter::default();
        let output = mock_unspent_output(&address(), 4, 0, 1_000, u64::MAX - 5, false);
        assert!(!filter.is_spendable(&output, u64::MAX));
    }

    #[test]
    fn test_filter_keeps_order() {
        let filter = MaturityFilter::for_network(NetworkId::Testnet, MIN_CONFIRMATIONS);
        let addr = address();
        let outputs = vec![
            mock_unspent_output(&addr, 1, 0, 300, 10, false),
            mock_unspent_output(&addr, 2, 0, 200, 995, false),
            mock_unspent_output(&addr, 3, 0, 100, 20, false),
            mock_unspent_output(&addr, 4, 0, 400, 10, true),
        ];

        let spendable = filter.filter(outputs, 1_000);
        let amounts: Vec<u64> = spendable.iter().map(UnspentOutput::amount).collect();
        assert_eq!(amounts, vec![300, 100, 400]);
    }
}
