//! The send pipeline
//!
//! A send attempt runs these stages in order, each one feeding the next:
//!
//! 1. fetch the wallet's unspent outputs and the current confirmation score
//! 2. keep the outputs that are spendable at that score
//! 3. select inputs greedily for `amount + fee`
//! 4. build and sign the transaction
//! 5. submit it
//!
//! Only the node calls suspend. Each of them is bounded by the configured
//! request timeout and can be interrupted through a cancellation channel.
//! Nothing is retried.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    address::Address,
    config::SenderConfig,
    data_structures::{format_kaspa, SignableTransaction, TransactionId, TransactionValues},
    errors::{SendStage, SenderError, SenderResult, TransportError},
    rpc::{RpcTransaction, TransactionSubmitter, UtxoSource},
    signing::prepare::{InputSelector, MaturityFilter, TransactionBuilder},
    wallet::Wallet,
};

/// A signed transaction that has not been submitted, together with the
/// outputs it spends
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    pub transaction: SignableTransaction,
    pub total_input: u64,
    pub send_amount: u64,
    pub fee: u64,
    pub change: u64,
}

impl PreparedTransaction {
    /// Id computed locally from the transaction contents
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction.tx.id()
    }

    pub fn input_count(&self) -> usize {
        self.transaction.tx.inputs.len()
    }
}

/// Result of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Id reported by the node
    pub transaction_id: String,
    pub input_count: usize,
    pub total_input: u64,
    pub send_amount: u64,
    pub fee: u64,
    pub change: u64,
}

pub struct TransactionSender {
    wallet: Wallet,
    config: SenderConfig,
    utxo_source: Arc<dyn UtxoSource>,
    submitter: Arc<dyn TransactionSubmitter>,
    cancel: Option<watch::Receiver<bool>>,
}

impl TransactionSender {
    pub fn new(
        wallet: Wallet,
        config: SenderConfig,
        utxo_source: Arc<dyn UtxoSource>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> SenderResult<Self> {
        config.validate()?;
        if wallet.network() != config.network {
            return Err(SenderError::ConfigurationError(format!(
                "wallet is for {} but the sender is configured for {}",
                wallet.network(),
                config.network
            )));
        }
        Ok(Self {
            wallet,
            config,
            utxo_source,
            submitter,
            cancel: None,
        })
    }

    /// Abort the attempt at the next node call once `true` is sent on the
    /// channel
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Run every stage except submission
    pub async fn prepare(
        &self,
        recipient: &Address,
        amount: u64,
    ) -> SenderResult<PreparedTransaction> {
        if amount == 0 {
            return Err(SenderError::ConfigurationError(
                "send amount must be greater than zero".to_string(),
            ));
        }
        let fee = self.config.fee;
        let required = amount.checked_add(fee).ok_or_else(|| {
            SenderError::ConfigurationError("send amount plus fee overflows".to_string())
        })?;
        let own_address = self.wallet.address();

        let outputs = self
            .call(
                SendStage::FetchUtxos,
                self.utxo_source.get_unspent_outputs(own_address),
            )
            .await?;
        let score = self
            .call(
                SendStage::FetchConfirmationScore,
                self.utxo_source.get_current_confirmation_score(),
            )
            .await?;
        let fetched = outputs.len();

        let filter = MaturityFilter::for_network(self.config.network, self.config.min_confirmations);
        let spendable = filter.filter(outputs, score);
        debug!(
            "{} of {} unspent outputs are spendable at DAA score {}",
            spendable.len(),
            fetched,
            score
        );

        let selection = InputSelector::new(self.config.max_inputs).select(spendable, required);
        if selection.is_empty() {
            warn!("No spendable outputs for {}", own_address);
            return Err(SenderError::NoSpendableOutputs {
                address: own_address.to_string(),
            });
        }
        if !selection.covers(required) {
            warn!(
                "Selected {} KAS across {} inputs but {} KAS is required",
                format_kaspa(selection.total_value),
                selection.len(),
                format_kaspa(required)
            );
            return Err(SenderError::InsufficientFunds {
                selected: selection.total_value,
                required,
                inputs: selection.len(),
            });
        }

        let change = selection.total_value - required;
        debug!(
            "Selected {} inputs totalling {} KAS, change {} KAS",
            selection.len(),
            format_kaspa(selection.total_value),
            format_kaspa(change)
        );

        let transaction = TransactionBuilder::new(self.config.network).build_signed(
            &self.wallet.signer(),
            &selection,
            amount,
            change,
            recipient,
            own_address,
        )?;
        debug_assert_eq!(transaction.fee(), Some(fee));

        Ok(PreparedTransaction {
            transaction,
            total_input: selection.total_value,
            send_amount: amount,
            fee,
            change,
        })
    }

    /// Prepare, sign and submit a payment of `amount` sompi to `recipient`
    pub async fn send(&self, recipient: &Address, amount: u64) -> SenderResult<SendOutcome> {
        let prepared = self.prepare(recipient, amount).await?;
        self.submit(&prepared).await
    }

    /// Submit a transaction returned by [`prepare`](Self::prepare)
    pub async fn submit(&self, prepared: &PreparedTransaction) -> SenderResult<SendOutcome> {
        let rpc_transaction = RpcTransaction::from(&prepared.transaction.tx);
        let transaction_id = self
            .call(SendStage::Submit, self.submitter.submit(&rpc_transaction))
            .await?;

        info!(
            "Sent {} KAS in transaction {} ({} inputs, fee {} KAS, change {} KAS)",
            format_kaspa(prepared.send_amount),
            transaction_id,
            prepared.input_count(),
            format_kaspa(prepared.fee),
            format_kaspa(prepared.change)
        );

        Ok(SendOutcome {
            transaction_id,
            input_count: prepared.input_count(),
            total_input: prepared.total_input,
            send_amount: prepared.send_amount,
            fee: prepared.fee,
            change: prepared.change,
        })
    }

    async fn call<T, F>(&self, stage: SendStage, request: F) -> SenderResult<T>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        debug!("Started {}", stage);
        let timeout = self.config.request_timeout;
        let bounded = tokio::time::timeout(timeout, request);

        let outcome = match self.cancel.clone() {
            Some(mut cancel) => tokio::select! {
                outcome = bounded => outcome,
                _ = cancelled(&mut cancel) => return Err(SenderError::Cancelled { stage }),
            },
            None => bounded.await,
        };

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(SenderError::transport(stage, source)),
            Err(_) => Err(SenderError::Timeout { stage, timeout }),
        }
    }
}

/// Resolves once `true` is sent. Never resolves if the sender is dropped.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
