use tracing::info;

use crate::{data_structures::format_kaspa, rpc::UnspentOutput};

/// Upper bound on the number of inputs in one transaction
pub const DEFAULT_MAX_INPUTS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    /// Chosen outputs, in the order they were offered
    pub chosen: Vec<UnspentOutput>,
    pub total_value: u64,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn covers(&self, required: u64) -> bool {
        self.total_value >= required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSelector {
    pub max_inputs: usize,
}

impl Default for InputSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUTS)
    }
}

impl InputSelector {
    pub fn new(max_inputs: usize) -> Self {
        Self { max_inputs }
    }

    /// Greedy first-fit selection in the order the outputs are offered.
    ///
    /// Stops as soon as `target` is reached or `max_inputs` outputs are
    /// chosen. Never fails: the result may fall short of `target` and the
    /// caller decides what to do about it.
    pub fn select<I>(&self, spendable: I, target: u64) -> SelectionResult
    where
        I: IntoIterator<Item = UnspentOutput>,
    {
        let mut selection = SelectionResult::default();

        if self.max_inputs == 0 {
            return selection;
        }

        for output in spendable {
            if selection.covers(target) {
                break;
            }
            let Some(total) = selection.total_value.checked_add(output.amount()) else {
                break;
            };
            selection.total_value = total;
            selection.chosen.push(output);

            if selection.len() >= self.max_inputs && !selection.covers(target) {
                info!(
                    "Reached the limit of {} inputs with {} KAS selected, {} KAS short",
                    self.max_inputs,
                    format_kaspa(selection.total_value),
                    format_kaspa(target - selection.total_value)
                );
                break;
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    use super::*;
    use crate::{
        address::{public_key_address, Address, Prefix},
        rpc::mocks::mock_unspent_output,
        signing::keys::parse_private_key_hex,
    };

    fn address() -> Address {
        let keypair = parse_private_key_hex(&"31".repeat(32)).unwrap();
        public_key_address(Prefix::Testnet, &keypair.x_only_public_key().0)
    }

    fn outputs(amounts: &[u64]) -> Vec<UnspentOutput> {
        let addr = address();
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| mock_unspent_output(&addr, (i % 251) as u8, i as u32, amount, 1, false))
            .collect()
    }

    #[test]
    fn test_selects_in_discovery_order() {
        let selector = InputSelector::default();
        let result = selector.select(outputs(&[200_000, 150_000, 50_000]), 210_000);

        assert_eq!(result.len(), 2);
        assert_eq!(result.total_value, 350_000);
        assert_eq!(result.chosen[0].amount(), 200_000);
        assert_eq!(result.chosen[1].amount(), 150_000);
        assert!(result.covers(210_000));
    }

    #[test]
    fn test_exact_cover_stops() {
        let selector = InputSelector::default();
        let result = selector.select(outputs(&[100, 100, 100]), 200);
        assert_eq!(result.len(), 2);
        assert_eq!(result.total_value, 200);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let result = InputSelector::default().select(Vec::new(), 10_000);
        assert!(result.is_empty());
        assert_eq!(result.total_value, 0);
        assert!(!result.covers(1));
    }

    #[test]
    fn test_input_cap() {
        let selector = InputSelector::default();
        let result = selector.select(outputs(&[1_000; 150]), 1_000_000);

        assert_eq!(result.len(), DEFAULT_MAX_INPUTS);
        assert_eq!(result.total_value, 100_000);
        assert!(!result.covers(1_000_000));
    }

    #[test]
    fn test_cap_applies_before_cover() {
        let selector = InputSelector::new(2);
        let result = selector.select(outputs(&[10, 10, 10]), 30);
        assert_eq!(result.len(), 2);
        assert_eq!(result.total_value, 20);
    }

    #[test]
    fn test_overflowing_output_stops_accumulation() {
        let result = InputSelector::default().select(outputs(&[u64::MAX - 1, 5, 5]), u64::MAX);
        assert_eq!(result.len(), 1);
        assert_eq!(result.total_value, u64::MAX - 1);
    }

    #[test]
    fn test_shuffled_sets_respect_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let count = rng.gen_range(0..160);
            let mut amounts: Vec<u64> = (0..count).map(|_| rng.gen_range(1..50_000)).collect();
            amounts.shuffle(&mut rng);
            let target = rng.gen_range(1..2_000_000);
            let offered = outputs(&amounts);

            let result = InputSelector::default().select(offered.clone(), target);

            assert!(result.len() <= DEFAULT_MAX_INPUTS);
            assert_eq!(
                result.total_value,
                result.chosen.iter().map(UnspentOutput::amount).sum::<u64>()
            );
            // Chosen outputs are a prefix of the offered ones
            assert_eq!(result.chosen[..], offered[..result.len()]);
            if result.covers(target) {
                // Dropping the last input would fall short
                let last = result.chosen.last().map_or(0, UnspentOutput::amount);
                assert!(result.total_value - last < target);
            } else {
                assert!(result.len() == offered.len() || result.len() == DEFAULT_MAX_INPUTS);
            }
        }
    }
}
