//! Main Hedera client entry point.
//!
//! The [`Hedera`] struct ties together configuration, the node selector, the
//! receipt poller and the operator that pays for transactions.

use crate::config::HederaConfig;
use crate::crypto::TransactionSigner;
use crate::error::{HederaError, HederaResult};
use crate::network::{ChannelFactory, HttpChannelFactory, Network};
use crate::poller::ReceiptPoller;
use crate::transaction::TransactionReceipt;
use crate::types::{AccountId, TransactionId, TransactionIdGenerator};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Valid-start timestamps are unique process-wide, across clients.
static TRANSACTION_IDS: TransactionIdGenerator = TransactionIdGenerator::new();

/// The account paying for transactions, with the key that signs for it.
#[derive(Clone)]
pub struct Operator {
    /// The payer account.
    pub account_id: AccountId,
    /// Signs on behalf of the payer.
    pub signer: Arc<dyn TransactionSigner>,
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("account_id", &self.account_id)
            .field("public_key", &hex::encode(self.signer.public_key_bytes()))
            .finish()
    }
}

/// The main entry point for the Hedera SDK.
///
/// A client is shared by reference between any number of concurrently
/// executing transactions; only the node health table and channel cache are
/// mutated, and both are internally synchronized.
///
/// # Example
///
/// ```rust,no_run
/// use hedera_rust_sdk::crypto::Ed25519PrivateKey;
/// use hedera_rust_sdk::transaction::TransferTransaction;
/// use hedera_rust_sdk::types::{AccountId, Hbar};
/// use hedera_rust_sdk::{Hedera, HederaConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let operator = AccountId::from_num(1001);
///     let key = Ed25519PrivateKey::from_string(&std::env::var("OPERATOR_KEY")?)?;
///
///     let mut client = Hedera::new(HederaConfig::testnet())?;
///     client.set_operator(operator, key);
///
///     let mut transfer = TransferTransaction::new();
///     transfer
///         .add_hbar_transfer(operator, -Hbar::new(1))?
///         .add_hbar_transfer(AccountId::from_num(1002), Hbar::new(1))?;
///     transfer.freeze_with(&client)?.sign_with_operator(&client)?;
///
///     let receipt = transfer.execute(&client).await?;
///     println!("status: {}", receipt.status);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Hedera {
    config: HederaConfig,
    network: Arc<Network>,
    poller: ReceiptPoller,
    operator: Option<Operator>,
}

impl Hedera {
    /// Creates a client talking to node gateways over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build (e.g., invalid TLS configuration).
    pub fn new(config: HederaConfig) -> HederaResult<Self> {
        let factory = HttpChannelFactory::new(&config)?;
        Ok(Self::with_channel_factory(config, Arc::new(factory)))
    }

    /// Creates a client whose channels come from `factory`.
    pub fn with_channel_factory(config: HederaConfig, factory: Arc<dyn ChannelFactory>) -> Self {
        let network = Arc::new(Network::new(
            config.nodes().to_vec(),
            factory,
            config.node_cooldown(),
        ));
        let poller = ReceiptPoller::new(network.clone(), config.poll_config().clone());
        Self {
            config,
            network,
            poller,
            operator: None,
        }
    }

    /// Creates a client for testnet with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn testnet() -> HederaResult<Self> {
        Self::new(HederaConfig::testnet())
    }

    /// Creates a client for mainnet with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn mainnet() -> HederaResult<Self> {
        Self::new(HederaConfig::mainnet())
    }

    /// Sets the account that pays for transactions and the key signing for it.
    pub fn set_operator(
        &mut self,
        account_id: AccountId,
        signer: impl TransactionSigner + 'static,
    ) -> &mut Self {
        self.operator = Some(Operator {
            account_id,
            signer: Arc::new(signer),
        });
        self
    }

    /// Returns the operator, if one is set.
    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    /// Returns the operator account, if one is set.
    pub fn operator_account_id(&self) -> Option<AccountId> {
        self.operator.as_ref().map(|op| op.account_id)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HederaConfig {
        &self.config
    }

    /// Returns the node selector.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns the receipt poller.
    pub fn poller(&self) -> &ReceiptPoller {
        &self.poller
    }

    /// Allocates a fresh transaction id paid by the operator.
    ///
    /// # Errors
    ///
    /// [`HederaError::OperatorNotSet`] without an operator.
    pub fn generate_transaction_id(&self) -> HederaResult<TransactionId> {
        let payer = self.operator_account_id().ok_or(HederaError::OperatorNotSet)?;
        Ok(TRANSACTION_IDS.generate(payer))
    }

    /// Waits for the receipt of any transaction id, not only ones submitted
    /// through this client.
    pub async fn get_transaction_receipt(
        &self,
        transaction_id: &TransactionId,
        timeout: Duration,
    ) -> HederaResult<TransactionReceipt> {
        self.poller.await_receipt(None, transaction_id, timeout).await
    }
}
