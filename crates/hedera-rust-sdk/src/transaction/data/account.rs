use super::{validate_memo, TransactionData};
use crate::crypto::Ed25519PublicKey;
use crate::error::{HederaError, HederaResult};
use crate::transaction::lifecycle::Transaction;
use crate::transaction::payload::TransactionPayload;
use crate::types::Hbar;
use std::time::Duration;

/// Default auto-renew period of new accounts and topics (90 days).
pub const DEFAULT_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(7_776_000);

/// Fields of an account-create transaction.
#[derive(Clone, Debug)]
pub struct AccountCreateData {
    key: Option<Ed25519PublicKey>,
    initial_balance: Hbar,
    receiver_signature_required: bool,
    auto_renew_period: Duration,
    account_memo: String,
}

impl Default for AccountCreateData {
    fn default() -> Self {
        Self {
            key: None,
            initial_balance: Hbar::ZERO,
            receiver_signature_required: false,
            auto_renew_period: DEFAULT_AUTO_RENEW_PERIOD,
            account_memo: String::new(),
        }
    }
}

impl TransactionData for AccountCreateData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        let key = self
            .key
            .ok_or(HederaError::IncompleteTransaction { field: "key" })?;
        Ok(TransactionPayload::AccountCreate {
            key: key.to_bytes().to_vec(),
            initial_balance: self.initial_balance,
            receiver_signature_required: self.receiver_signature_required,
            auto_renew_period_secs: self.auto_renew_period.as_secs(),
            account_memo: self.account_memo.clone(),
        })
    }
}

/// Creates a new account. The receipt carries the new account id.
///
/// # Example
///
/// ```rust
/// use hedera_rust_sdk::crypto::Ed25519PrivateKey;
/// use hedera_rust_sdk::transaction::AccountCreateTransaction;
/// use hedera_rust_sdk::types::Hbar;
///
/// # fn main() -> hedera_rust_sdk::HederaResult<()> {
/// let new_key = Ed25519PrivateKey::generate();
/// let mut txn = AccountCreateTransaction::new();
/// txn.set_key(new_key.public_key())?
///     .set_initial_balance(Hbar::from_tinybars(100_000_000))?
///     .set_account_memo("My new account")?;
/// # Ok(())
/// # }
/// ```
pub type AccountCreateTransaction = Transaction<AccountCreateData>;

impl Transaction<AccountCreateData> {
    /// Sets the key that will control the account. Required.
    pub fn set_key(&mut self, key: Ed25519PublicKey) -> HederaResult<&mut Self> {
        self.data_mut()?.key = Some(key);
        Ok(self)
    }

    /// Sets the amount moved from the payer into the new account.
    pub fn set_initial_balance(&mut self, balance: Hbar) -> HederaResult<&mut Self> {
        let data = self.data_mut()?;
        if balance.is_negative() {
            return Err(HederaError::InvalidTransaction(format!(
                "initial balance must not be negative, got {balance}"
            )));
        }
        data.initial_balance = balance;
        Ok(self)
    }

    /// Requires the account's signature on incoming transfers.
    pub fn set_receiver_signature_required(&mut self, required: bool) -> HederaResult<&mut Self> {
        self.data_mut()?.receiver_signature_required = required;
        Ok(self)
    }

    /// Sets how often the account is automatically renewed.
    pub fn set_auto_renew_period(&mut self, period: Duration) -> HederaResult<&mut Self> {
        self.data_mut()?.auto_renew_period = period;
        Ok(self)
    }

    /// Sets the memo stored on the account.
    pub fn set_account_memo(&mut self, memo: impl Into<String>) -> HederaResult<&mut Self> {
        let data = self.data_mut()?;
        let memo = memo.into();
        validate_memo("account_memo", &memo)?;
        data.account_memo = memo;
        Ok(self)
    }

    /// Returns the account key.
    pub fn key(&self) -> Option<&Ed25519PublicKey> {
        self.data.key.as_ref()
    }

    /// Returns the initial balance.
    pub fn initial_balance(&self) -> Hbar {
        self.data.initial_balance
    }
}
