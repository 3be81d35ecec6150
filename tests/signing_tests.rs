//! Key, address and signing checks against known values

use kaspa_consensus_core::hashing::{
    sighash::{calc_schnorr_signature_hash, SigHashReusedValuesUnsync},
    sighash_type::SIG_HASH_ALL,
};
use kaspa_tx_sender::{
    address::{parse_address, Prefix},
    data_structures::{
        native_transaction, unsigned_input, SignableTransaction, TransactionId,
        TransactionOutpoint, TransactionOutput, TransactionValues, UtxoEntry,
    },
    errors::{AddressError, SigningError},
    network::NetworkId,
    signing::{keys::parse_private_key_hex, parse_signature_script, verify_all_inputs, Signer},
    wallet::Wallet,
};
use kaspa_txscript::pay_to_address_script;

const PRIVATE_KEY: &str = "5352da6a9b87829610211727c253c34eed7f8d39ef4530db6b79e40e844bccd0";
const ADDRESS: &str = "kaspatest:qzj7mhr248ml9znje52egmarcqfk8t2zu6ju0hyp0zc3g3ate2hrj4pr0ggx3";
const PUBLIC_KEY: &str = "a5eddc6aa9f7f28a72cd15946fa3c01363ad42e6a5c7dc8178b11447abcaae39";

fn spend_to_self(amounts: &[u64]) -> (Signer, SignableTransaction) {
    let wallet = Wallet::from_private_key_hex(PRIVATE_KEY, NetworkId::Testnet).unwrap();
    let script = pay_to_address_script(wallet.address());
    let inputs = (0..amounts.len())
        .map(|i| {
            unsigned_input(TransactionOutpoint::new(
                TransactionId::from_bytes([0x10 + i as u8; 32]),
                i as u32,
            ))
        })
        .collect();
    let entries = amounts
        .iter()
        .map(|&amount| UtxoEntry::new(amount, script.clone(), 1_000, false))
        .collect();
    let total: u64 = amounts.iter().sum();
    let tx = native_transaction(inputs, vec![TransactionOutput::new(total - 100_000, script)]);
    (wallet.signer(), SignableTransaction::with_entries(tx, entries))
}

#[test]
fn test_known_key_derives_known_address() {
    let wallet = Wallet::from_private_key_hex(PRIVATE_KEY, NetworkId::Testnet).unwrap();
    assert_eq!(wallet.address().to_string(), ADDRESS);
    assert_eq!(hex::encode(wallet.public_key().serialize()), PUBLIC_KEY);

    let decoded = parse_address(ADDRESS, Prefix::Testnet).unwrap();
    assert_eq!(&decoded, wallet.address());
    assert_eq!(
        parse_address(ADDRESS, Prefix::Mainnet),
        Err(AddressError::PrefixMismatch {
            expected: "kaspa".to_string(),
            actual: "kaspatest".to_string(),
        })
    );
}

#[test]
fn test_locking_script_of_known_address() {
    let address = parse_address(ADDRESS, Prefix::Testnet).unwrap();
    let script = pay_to_address_script(&address);
    assert_eq!(script.version(), 0);
    assert_eq!(hex::encode(script.script()), format!("20{PUBLIC_KEY}ac"));
}

#[test]
fn test_every_input_gets_a_verifiable_signature() {
    let (signer, mut tx) = spend_to_self(&[300_000, 200_000, 700_000, 50_000]);
    let unsigned_id = tx.tx.id();

    signer.sign_all_inputs(&mut tx).unwrap();

    assert!(tx.is_fully_signed());
    assert_eq!(tx.fee(), Some(100_000));
    assert_eq!(tx.tx.id(), unsigned_id);
    for input in &tx.tx.inputs {
        let (_, sighash_type) = parse_signature_script(&input.signature_script).unwrap();
        assert_eq!(sighash_type, SIG_HASH_ALL.to_u8());
    }
    verify_all_inputs(&tx).unwrap();
    kaspa_consensus_core::sign::verify(&tx.as_verifiable()).unwrap();
}

#[test]
fn test_signatures_differ_per_input() {
    let (signer, mut tx) = spend_to_self(&[100_000, 100_000]);
    signer.sign_all_inputs(&mut tx).unwrap();
    assert_ne!(tx.tx.inputs[0].signature_script, tx.tx.inputs[1].signature_script);
}

#[test]
fn test_shared_cache_matches_fresh_cache() {
    let (_, tx) = spend_to_self(&[120_000, 130_000, 140_000]);
    let verifiable = tx.as_verifiable();
    let shared = SigHashReusedValuesUnsync::new();
    for index in 0..tx.tx.inputs.len() {
        let with_shared = calc_schnorr_signature_hash(&verifiable, index, SIG_HASH_ALL, &shared);
        let with_fresh = calc_schnorr_signature_hash(
            &verifiable,
            index,
            SIG_HASH_ALL,
            &SigHashReusedValuesUnsync::new(),
        );
        assert_eq!(with_shared, with_fresh);
    }
}

#[test]
fn test_changing_amount_of_spent_output_breaks_signature() {
    let (signer, mut tx) = spend_to_self(&[500_000, 600_000]);
    signer.sign_all_inputs(&mut tx).unwrap();

    if let Some(entry) = tx.entries[1].as_mut() {
        entry.amount += 1;
    }
    assert_eq!(
        verify_all_inputs(&tx),
        Err(SigningError::VerificationFailed { index: 1 })
    );
}

#[test]
fn test_out_of_range_input_index() {
    let (signer, mut tx) = spend_to_self(&[500_000]);
    signer.sign_all_inputs(&mut tx).unwrap();
    assert_eq!(
        kaspa_tx_sender::signing::verify_input(&tx, 1, &SigHashReusedValuesUnsync::new()),
        Err(SigningError::InputIndexOutOfRange { index: 1, count: 1 })
    );
}

#[test]
fn test_other_key_cannot_sign() {
    let (_, mut tx) = spend_to_self(&[500_000]);
    let stranger = Signer::new(parse_private_key_hex(&"77".repeat(32)).unwrap());
    assert_eq!(
        stranger.sign_all_inputs(&mut tx),
        Err(SigningError::ForeignInput { index: 0 })
    );
}
