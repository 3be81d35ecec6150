//! Schnorr signing of every transaction input
//!
//! Every input is signed under `SIG_HASH_ALL`, so each signature commits to
//! all inputs and outputs. The intermediate hashes shared by the input
//! digests are computed once per transaction and reused for every input.

use std::fmt::{Debug, Formatter};

use kaspa_consensus_core::hashing::{
    sighash::{calc_schnorr_signature_hash, SigHashReusedValuesUnsync},
    sighash_type::SIG_HASH_ALL,
};
use kaspa_txscript::{
    extract_script_pub_key_address, opcodes::codes::OpData65, pay_to_address_script,
    script_builder::ScriptBuilder,
};
use secp256k1::{schnorr::Signature, Keypair, Message, XOnlyPublicKey, SECP256K1};

use crate::{
    address::{public_key_address, Prefix, Version},
    data_structures::{ScriptPublicKey, SignableTransaction, UtxoEntry},
    errors::SigningError,
};

/// Signs transactions whose inputs are all locked to one Schnorr key
pub struct Signer {
    keypair: Keypair,
    public_key: XOnlyPublicKey,
    locking_script: ScriptPublicKey,
}

impl Signer {
    pub fn new(keypair: Keypair) -> Self {
        let (public_key, _parity) = keypair.x_only_public_key();
        // Pay-to-pubkey scripts are the same on every network
        let locking_script = pay_to_address_script(&public_key_address(Prefix::Mainnet, &public_key));
        Self {
            keypair,
            public_key,
            locking_script,
        }
    }

    pub fn public_key(&self) -> XOnlyPublicKey {
        self.public_key
    }

    /// The script every input this signer can spend is locked with
    pub fn locking_script(&self) -> &ScriptPublicKey {
        &self.locking_script
    }

    /// Fill in the signature script of every input.
    ///
    /// All digests are computed before any script is written, and each
    /// signature is verified before it is accepted. On error the transaction
    /// is left unsigned.
    pub fn sign_all_inputs(&self, tx: &mut SignableTransaction) -> Result<(), SigningError> {
        if let Some(index) = first_missing_entry(tx) {
            return Err(SigningError::MissingUtxoEntry { index });
        }
        for (index, entry) in tx.entries.iter().enumerate() {
            self.check_owned(index, entry.as_ref())?;
        }

        let reused = SigHashReusedValuesUnsync::new();
        let signature_scripts = {
            let verifiable = tx.as_verifiable();
            (0..tx.tx.inputs.len())
                .map(|index| {
                    let digest =
                        calc_schnorr_signature_hash(&verifiable, index, SIG_HASH_ALL, &reused);
                    let message = Message::from_digest(digest.as_bytes());
                    let signature = SECP256K1.sign_schnorr_no_aux_rand(&message, &self.keypair);
                    SECP256K1
                        .verify_schnorr(&signature, &message, &self.public_key)
                        .map_err(|e| SigningError::Crypto(format!("input {index}: {e}")))?;
                    signature_script(&signature)
                })
                .collect::<Result<Vec<_>, SigningError>>()?
        };

        for (input, script) in tx.tx.inputs.iter_mut().zip(signature_scripts) {
            input.signature_script = script;
        }

        tracing::debug!(
            "Signed {} inputs of transaction {}",
            tx.tx.inputs.len(),
            tx.tx.id()
        );
        Ok(())
    }

    fn check_owned(&self, index: usize, entry: Option<&UtxoEntry>) -> Result<(), SigningError> {
        let entry = entry.ok_or(SigningError::MissingUtxoEntry { index })?;
        if entry.script_public_key == self.locking_script {
            return Ok(());
        }
        match schnorr_public_key(&entry.script_public_key) {
            Some(_) => Err(SigningError::ForeignInput { index }),
            None => Err(SigningError::UnsupportedScript { index }),
        }
    }
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

fn first_missing_entry(tx: &SignableTransaction) -> Option<usize> {
    (0..tx.tx.inputs.len()).find(|&index| !matches!(tx.entries.get(index), Some(Some(_))))
}

/// The key a Schnorr pay-to-pubkey script is locked to
fn schnorr_public_key(script_public_key: &ScriptPublicKey) -> Option<XOnlyPublicKey> {
    let address = extract_script_pub_key_address(script_public_key, Prefix::Mainnet).ok()?;
    if address.version != Version::PubKey {
        return None;
    }
    XOnlyPublicKey::from_slice(&address.payload).ok()
}

/// Push of `signature || SIG_HASH_ALL`
fn signature_script(signature: &Signature) -> Result<Vec<u8>, SigningError> {
    let mut data = Vec::with_capacity(65);
    data.extend_from_slice(&signature.serialize());
    data.push(SIG_HASH_ALL.to_u8());

    let mut builder = ScriptBuilder::new();
    builder
        .add_data(&data)
        .map_err(|e| SigningError::Crypto(e.to_string()))?;
    Ok(builder.drain())
}

/// Split a Schnorr signature script into signature and sighash type
pub fn parse_signature_script(script: &[u8]) -> Option<([u8; 64], u8)> {
    match script {
        [OpData65, rest @ ..] if rest.len() == 65 => {
            let signature: [u8; 64] = rest[..64].try_into().ok()?;
            Some((signature, rest[64]))
        }
        _ => None,
    }
}

/// Check the signature of input `index` against its locking script
pub fn verify_input(
    tx: &SignableTransaction,
    index: usize,
    reused: &SigHashReusedValuesUnsync,
) -> Result<(), SigningError> {
    let input = tx.tx.inputs.get(index).ok_or(SigningError::InputIndexOutOfRange {
        index,
        count: tx.tx.inputs.len(),
    })?;
    if let Some(missing) = first_missing_entry(tx) {
        return Err(SigningError::MissingUtxoEntry { index: missing });
    }
    let entry = tx.entries[index]
        .as_ref()
        .ok_or(SigningError::MissingUtxoEntry { index })?;

    let public_key = schnorr_public_key(&entry.script_public_key)
        .ok_or(SigningError::UnsupportedScript { index })?;

    let (signature_bytes, sighash_type) = parse_signature_script(&input.signature_script)
        .ok_or(SigningError::MissingSignature { index })?;
    if sighash_type != SIG_HASH_ALL.to_u8() {
        return Err(SigningError::VerificationFailed { index });
    }
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|_| SigningError::VerificationFailed { index })?;

    let digest = calc_schnorr_signature_hash(&tx.as_verifiable(), index, SIG_HASH_ALL, reused);
    let message = Message::from_digest(digest.as_bytes());
    SECP256K1
        .verify_schnorr(&signature, &message, &public_key)
        .map_err(|_| SigningError::VerificationFailed { index })
}

/// Check every input signature of a transaction
pub fn verify_all_inputs(tx: &SignableTransaction) -> Result<(), SigningError> {
    let reused = SigHashReusedValuesUnsync::new();
    (0..tx.tx.inputs.len()).try_for_each(|index| verify_input(tx, index, &reused))
}
