use kaspa_txscript::pay_to_address_script;
use tracing::debug;

use crate::{
    address::Address,
    data_structures::{
        native_transaction, unsigned_input, ScriptPublicKey, SignableTransaction, TransactionId,
        TransactionInput, TransactionOutpoint, TransactionOutput, TransactionValues, UtxoEntry,
    },
    errors::{BuildError, SenderResult},
    hex_utils::decode_fixed,
    network::NetworkId,
    rpc::UnspentOutput,
    signing::{prepare::input_selector::SelectionResult, signer::Signer},
};

/// Assembles unsigned single-recipient transactions for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionBuilder {
    network: NetworkId,
}

impl TransactionBuilder {
    pub fn new(network: NetworkId) -> Self {
        Self { network }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    /// Build the unsigned transaction spending every selected output.
    ///
    /// The recipient output comes first. A change output is added only
    /// when `change_amount` is non-zero.
    pub fn build(
        &self,
        selection: &SelectionResult,
        send_amount: u64,
        change_amount: u64,
        recipient: &Address,
        change_address: &Address,
    ) -> Result<SignableTransaction, BuildError> {
        if selection.is_empty() {
            return Err(BuildError::NoInputs);
        }
        self.check_network(recipient)?;
        self.check_network(change_address)?;

        let (inputs, entries): (Vec<_>, Vec<_>) = selection
            .chosen
            .iter()
            .enumerate()
            .map(|(index, output)| to_input(index, output))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unzip();

        let mut outputs = vec![TransactionOutput::new(
            send_amount,
            pay_to_address_script(recipient),
        )];
        if change_amount > 0 {
            outputs.push(TransactionOutput::new(
                change_amount,
                pay_to_address_script(change_address),
            ));
        }

        let tx = SignableTransaction::with_entries(native_transaction(inputs, outputs), entries);
        let total_inputs = tx.total_input_value().unwrap_or(u64::MAX);
        match tx.total_output_value() {
            Some(total_outputs) if total_outputs <= total_inputs => {}
            total_outputs => {
                return Err(BuildError::OutputsExceedInputs {
                    inputs: total_inputs,
                    outputs: total_outputs.unwrap_or(u64::MAX),
                })
            }
        }

        debug!(
            "Built transaction {} with {} inputs and {} outputs",
            tx.tx.id(),
            tx.tx.inputs.len(),
            tx.tx.outputs.len()
        );
        Ok(tx)
    }

    /// [`build`](Self::build) followed by signing every input with `signer`
    pub fn build_signed(
        &self,
        signer: &Signer,
        selection: &SelectionResult,
        send_amount: u64,
        change_amount: u64,
        recipient: &Address,
        change_address: &Address,
    ) -> SenderResult<SignableTransaction> {
        let mut tx = self.build(
            selection,
            send_amount,
            change_amount,
            recipient,
            change_address,
        )?;
        signer.sign_all_inputs(&mut tx)?;
        Ok(tx)
    }

    fn check_network(&self, address: &Address) -> Result<(), BuildError> {
        let expected = self.network.prefix();
        if address.prefix != expected {
            return Err(BuildError::NetworkMismatch {
                expected: expected.to_string(),
                actual: address.prefix.to_string(),
            });
        }
        Ok(())
    }
}

fn to_input(
    index: usize,
    output: &UnspentOutput,
) -> Result<(TransactionInput, UtxoEntry), BuildError> {
    let transaction_id: [u8; 32] = decode_fixed(&output.outpoint.transaction_id).map_err(|e| {
        BuildError::MalformedOutpoint {
            index,
            reason: e.to_string(),
        }
    })?;

    let spk = &output.utxo_entry.script_public_key;
    let script = hex::decode(&spk.script).map_err(|e| BuildError::MalformedScript {
        index,
        reason: e.to_string(),
    })?;
    if script.is_empty() {
        return Err(BuildError::MalformedScript {
            index,
            reason: "empty locking script".to_string(),
        });
    }

    let outpoint = TransactionOutpoint::new(
        TransactionId::from_bytes(transaction_id),
        output.outpoint.index,
    );
    let entry = UtxoEntry::new(
        output.amount(),
        ScriptPublicKey::from_vec(spk.version, script),
        output.block_daa_score(),
        output.is_coinbase(),
    );
    Ok((unsigned_input(outpoint), entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::{public_key_address, Prefix},
        data_structures::{SUBNETWORK_ID_NATIVE, TX_VERSION},
        rpc::mocks::mock_unspent_output,
        signing::{keys::parse_private_key_hex, signer::verify_all_inputs},
    };

    fn signer(seed: u8) -> Signer {
        Signer::new(parse_private_key_hex(&format!("{seed:02x}").repeat(32)).unwrap())
    }

    fn address_of(signer: &Signer, prefix: Prefix) -> Address {
        public_key_address(prefix, &signer.public_key())
    }

    fn selection(address: &Address, amounts: &[u64]) -> SelectionResult {
        let chosen: Vec<UnspentOutput> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| mock_unspent_output(address, i as u8 + 1, i as u32, amount, 1, false))
            .collect();
        SelectionResult {
            total_value: amounts.iter().sum(),
            chosen,
        }
    }

    #[test]
    fn test_build_with_change() {
        let sender = signer(1);
        let recipient = address_of(&signer(2), Prefix::Testnet);
        let own = address_of(&sender, Prefix::Testnet);
        let builder = TransactionBuilder::new(NetworkId::Testnet);

        let tx = builder
            .build(&selection(&own, &[200_000, 150_000]), 200_000, 50_000, &recipient, &own)
            .unwrap();

        assert_eq!(tx.tx.inputs.len(), 2);
        assert_eq!(tx.entries.len(), 2);
        assert_eq!(tx.tx.outputs.len(), 2);
        assert_eq!(tx.tx.outputs[0].value, 200_000);
        assert_eq!(tx.tx.outputs[0].script_public_key, pay_to_address_script(&recipient));
        assert_eq!(tx.tx.outputs[1].value, 50_000);
        assert_eq!(tx.tx.outputs[1].script_public_key, pay_to_address_script(&own));
        assert_eq!(tx.fee(), Some(100_000));

        assert_eq!(tx.tx.version, TX_VERSION);
        assert_eq!(tx.tx.lock_time, 0);
        assert_eq!(tx.tx.subnetwork_id, SUBNETWORK_ID_NATIVE);
        assert_eq!(tx.tx.gas, 0);
        assert!(tx.tx.payload.is_empty());
        assert!(tx
            .tx
            .inputs
            .iter()
            .all(|i| i.sig_op_count == 1 && i.signature_script.is_empty()));
        assert_eq!(tx.tx.inputs[1].previous_outpoint.index, 1);
        assert_eq!(
            tx.tx.inputs[1].previous_outpoint.transaction_id,
            TransactionId::from_bytes([2; 32])
        );
        let entry = tx.entries[1].as_ref().unwrap();
        assert_eq!(entry.amount, 150_000);
        assert_eq!(entry.script_public_key, *sender.locking_script());
    }

    #[test]
    fn test_no_change_output_when_exact() {
        let own = address_of(&signer(3), Prefix::Testnet);
        let tx = TransactionBuilder::new(NetworkId::Testnet)
            .build(&selection(&own, &[300_000]), 200_000, 0, &own, &own)
            .unwrap();
        assert_eq!(tx.tx.outputs.len(), 1);
        assert_eq!(tx.fee(), Some(100_000));
    }

    #[test]
    fn test_empty_selection() {
        let own = address_of(&signer(4), Prefix::Testnet);
        let result = TransactionBuilder::new(NetworkId::Testnet).build(
            &SelectionResult::default(),
            1,
            0,
            &own,
            &own,
        );
        assert!(matches!(result, Err(BuildError::NoInputs)));
    }

    #[test]
    fn test_malformed_outpoint_and_script() {
        let own = address_of(&signer(5), Prefix::Testnet);
        let builder = TransactionBuilder::new(NetworkId::Testnet);

        let mut bad_id = selection(&own, &[10_000, 10_000]);
        bad_id.chosen[1].outpoint.transaction_id = "abcd".to_string();
        assert!(matches!(
            builder.build(&bad_id, 1_000, 0, &own, &own),
            Err(BuildError::MalformedOutpoint { index: 1, .. })
        ));

        let mut bad_script = selection(&own, &[10_000]);
        bad_script.chosen[0].utxo_entry.script_public_key.script = "zz".to_string();
        assert!(matches!(
            builder.build(&bad_script, 1_000, 0, &own, &own),
            Err(BuildError::MalformedScript { index: 0, .. })
        ));

        let mut empty_script = selection(&own, &[10_000]);
        empty_script.chosen[0].utxo_entry.script_public_key.script = String::new();
        assert!(matches!(
            builder.build(&empty_script, 1_000, 0, &own, &own),
            Err(BuildError::MalformedScript { index: 0, .. })
        ));
    }

    #[test]
    fn test_network_mismatch() {
        let sender = signer(6);
        let own = address_of(&sender, Prefix::Testnet);
        let mainnet_recipient = address_of(&signer(7), Prefix::Mainnet);
        let result = TransactionBuilder::new(NetworkId::Testnet).build(
            &selection(&own, &[10_000]),
            1_000,
            0,
            &mainnet_recipient,
            &own,
        );
        assert_eq!(
            result.err(),
            Some(BuildError::NetworkMismatch {
                expected: "kaspatest".to_string(),
                actual: "kaspa".to_string(),
            })
        );
    }

    #[test]
    fn test_outputs_exceeding_inputs() {
        let own = address_of(&signer(8), Prefix::Testnet);
        let result = TransactionBuilder::new(NetworkId::Testnet).build(
            &selection(&own, &[10_000]),
            9_000,
            2_000,
            &own,
            &own,
        );
        assert_eq!(
            result.err(),
            Some(BuildError::OutputsExceedInputs {
                inputs: 10_000,
                outputs: 11_000,
            })
        );
    }

    #[test]
    fn test_build_signed_verifies() {
        let sender = signer(9);
        let own = address_of(&sender, Prefix::Testnet);
        let recipient = address_of(&signer(10), Prefix::Testnet);
        let tx = TransactionBuilder::new(NetworkId::Testnet)
            .build_signed(
                &sender,
                &selection(&own, &[40_000, 70_000]),
                60_000,
                40_000,
                &recipient,
                &own,
            )
            .unwrap();
        assert!(tx.is_fully_signed());
        verify_all_inputs(&tx).unwrap();
    }
}
