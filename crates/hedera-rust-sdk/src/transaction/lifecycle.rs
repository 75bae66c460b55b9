//! The transaction state machine.
//!
//! ```text
//! Building --freeze--> Frozen --sign--> Signed --execute--> Submitted --> Finalized
//!                        |                |                     |
//!                        +---> Failed <---+---------------------+--> TimedOut
//! ```
//!
//! No edge leads back to an earlier state. A caller that wants to retry the
//! whole operation builds a new transaction, for example with
//! [`Transaction::rebuild`].

use crate::config::{DEFAULT_MAX_TRANSACTION_FEE, DEFAULT_TRANSACTION_VALID_DURATION};
use crate::crypto::TransactionSigner;
use crate::error::{HederaError, HederaResult};
use crate::hedera::Hedera;
use crate::transaction::data::{validate_memo, TransactionData};
use crate::transaction::payload::TransactionKind;
use crate::transaction::receipt::TransactionReceipt;
use crate::transaction::types::{SignaturePair, SignedTransaction, TransactionBody};
use crate::types::{AccountId, Hbar, TransactionId};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Where a transaction is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Fields are settable.
    Building,
    /// Body bytes, id and node are fixed; no signatures yet.
    Frozen,
    /// At least one signature is attached.
    Signed,
    /// Sent to the designated node and accepted at precheck.
    Submitted,
    /// The receipt reports success.
    Finalized,
    /// Rejected, unreachable node, failed signer or failed receipt.
    Failed,
    /// The receipt did not arrive in time; the outcome is unknown.
    TimedOut,
}

impl TransactionState {
    /// Returns the state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Frozen => "Frozen",
            Self::Signed => "Signed",
            Self::Submitted => "Submitted",
            Self::Finalized => "Finalized",
            Self::Failed => "Failed",
            Self::TimedOut => "TimedOut",
        }
    }

    /// True for `Finalized`, `Failed` and `TimedOut`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed | Self::TimedOut)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction of kind `D`, from building through to its receipt.
///
/// # Example
///
/// ```rust
/// use hedera_rust_sdk::crypto::Ed25519PrivateKey;
/// use hedera_rust_sdk::transaction::{TransactionState, TransferTransaction};
/// use hedera_rust_sdk::types::{AccountId, Hbar, Timestamp, TransactionId};
///
/// # fn main() -> hedera_rust_sdk::HederaResult<()> {
/// let payer = AccountId::from_num(2);
/// let key = Ed25519PrivateKey::generate();
///
/// let mut transfer = TransferTransaction::new();
/// transfer
///     .add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-10))?
///     .add_hbar_transfer(payer, Hbar::from_tinybars(10))?
///     .set_memo("rent")?;
///
/// let id = TransactionId::new(payer, Timestamp::new(1_700_000_000, 0));
/// transfer.freeze(id, AccountId::from_num(3))?.sign(&key)?;
///
/// assert_eq!(transfer.state(), TransactionState::Signed);
/// assert!(transfer.verify_signatures().is_ok());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Transaction<D> {
    pub(crate) data: D,
    pub(crate) state: TransactionState,
    memo: String,
    max_transaction_fee: Option<Hbar>,
    transaction_valid_duration: Option<Duration>,
    pub(crate) node_account_id: Option<AccountId>,
    pub(crate) transaction_id: Option<TransactionId>,
    pub(crate) kind: Option<TransactionKind>,
    body_bytes: Option<Vec<u8>>,
    signatures: Vec<SignaturePair>,
    pub(crate) accepted: bool,
    pub(crate) receipt: Option<TransactionReceipt>,
}

impl<D: TransactionData + Default> Default for Transaction<D> {
    fn default() -> Self {
        Self::from_data(D::default())
    }
}

impl<D: TransactionData + Default> Transaction<D> {
    /// Creates an empty transaction in the `Building` state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: TransactionData> Transaction<D> {
    /// Wraps prepared kind data in a new `Building` transaction.
    pub fn from_data(data: D) -> Self {
        Self {
            data,
            state: TransactionState::Building,
            memo: String::new(),
            max_transaction_fee: None,
            transaction_valid_duration: None,
            node_account_id: None,
            transaction_id: None,
            kind: None,
            body_bytes: None,
            signatures: Vec::new(),
            accepted: false,
            receipt: None,
        }
    }

    fn ensure_building(&self) -> HederaResult<()> {
        match (self.state, self.transaction_id) {
            (TransactionState::Building, _) => Ok(()),
            (_, Some(transaction_id)) => Err(HederaError::FrozenTransaction { transaction_id }),
            (state, None) => Err(HederaError::InvalidState {
                operation: "modify",
                state,
                transaction_id: None,
            }),
        }
    }

    /// Mutable access to the kind data, only while `Building`.
    pub(crate) fn data_mut(&mut self) -> HederaResult<&mut D> {
        self.ensure_building()?;
        Ok(&mut self.data)
    }

    /// Sets the transaction memo (at most 100 bytes).
    pub fn set_memo(&mut self, memo: impl Into<String>) -> HederaResult<&mut Self> {
        self.ensure_building()?;
        let memo = memo.into();
        validate_memo("memo", &memo)?;
        self.memo = memo;
        Ok(self)
    }

    /// Sets the maximum fee the payer agrees to pay.
    pub fn set_max_transaction_fee(&mut self, fee: Hbar) -> HederaResult<&mut Self> {
        self.ensure_building()?;
        if fee.is_negative() {
            return Err(HederaError::InvalidTransaction(format!(
                "max transaction fee must not be negative, got {fee}"
            )));
        }
        self.max_transaction_fee = Some(fee);
        Ok(self)
    }

    /// Sets how long after its valid start the transaction is accepted.
    pub fn set_transaction_valid_duration(&mut self, duration: Duration) -> HederaResult<&mut Self> {
        self.ensure_building()?;
        self.transaction_valid_duration = Some(duration);
        Ok(self)
    }

    /// Prefers this node when the transaction is frozen through a client.
    pub fn set_node_account_id(&mut self, node_account_id: AccountId) -> HederaResult<&mut Self> {
        self.ensure_building()?;
        self.node_account_id = Some(node_account_id);
        Ok(self)
    }

    /// Uses this id instead of allocating one when frozen through a client.
    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) -> HederaResult<&mut Self> {
        self.ensure_building()?;
        self.transaction_id = Some(transaction_id);
        Ok(self)
    }

    /// Freezes the transaction for `node_account_id` under `transaction_id`.
    ///
    /// The payload is built and the body bytes computed here, exactly once.
    /// On error the transaction is left untouched and still `Building`.
    ///
    /// # Errors
    ///
    /// * [`HederaError::InvalidState`] if the transaction is already frozen.
    /// * [`HederaError::IncompleteTransaction`] if a required field is unset.
    /// * [`HederaError::InvalidTransaction`] if the fields are inconsistent.
    pub fn freeze(
        &mut self,
        transaction_id: TransactionId,
        node_account_id: AccountId,
    ) -> HederaResult<&mut Self> {
        self.freeze_inner(
            transaction_id,
            node_account_id,
            DEFAULT_MAX_TRANSACTION_FEE,
            DEFAULT_TRANSACTION_VALID_DURATION,
        )
    }

    /// Freezes the transaction using the client's operator and network.
    ///
    /// The id is the one set with [`set_transaction_id`](Self::set_transaction_id),
    /// or a fresh one for the client operator. The node is the preferred one
    /// set with [`set_node_account_id`](Self::set_node_account_id) if healthy,
    /// otherwise whichever node the selector picks.
    pub fn freeze_with(&mut self, client: &Hedera) -> HederaResult<&mut Self> {
        if self.state != TransactionState::Building {
            return Err(self.invalid_state("freeze"));
        }
        let transaction_id = match self.transaction_id {
            Some(id) => id,
            None => client.generate_transaction_id()?,
        };
        let node_account_id = client.network().pick(self.node_account_id)?;
        let config = client.config();
        self.freeze_inner(
            transaction_id,
            node_account_id,
            config.default_max_transaction_fee(),
            config.transaction_valid_duration(),
        )
    }

    fn freeze_inner(
        &mut self,
        transaction_id: TransactionId,
        node_account_id: AccountId,
        default_fee: Hbar,
        default_valid_duration: Duration,
    ) -> HederaResult<&mut Self> {
        if self.state != TransactionState::Building {
            return Err(self.invalid_state("freeze"));
        }

        let payload = self.data.build_payload()?;
        validate_memo("memo", &self.memo)?;
        let kind = payload.kind();
        let transaction_fee = self
            .max_transaction_fee
            .or_else(|| self.data.default_max_transaction_fee())
            .unwrap_or(default_fee);
        let valid_duration = self
            .transaction_valid_duration
            .unwrap_or(default_valid_duration);

        let body = TransactionBody {
            transaction_id,
            node_account_id,
            transaction_fee,
            transaction_valid_duration_secs: valid_duration.as_secs(),
            memo: self.memo.clone(),
            payload,
        };
        let body_bytes = body.to_bytes()?;

        self.transaction_id = Some(transaction_id);
        self.node_account_id = Some(node_account_id);
        self.kind = Some(kind);
        self.body_bytes = Some(body_bytes);
        self.state = TransactionState::Frozen;

        debug!(
            transaction_id = %transaction_id,
            node = %node_account_id,
            kind = %kind,
            fee = %transaction_fee,
            "transaction frozen"
        );
        Ok(self)
    }

    /// Signs the frozen body bytes with `signer`.
    ///
    /// Signing twice with the same key replaces the earlier signature. If the
    /// signer fails, the transaction moves to `Failed`.
    ///
    /// # Errors
    ///
    /// * [`HederaError::NotFrozen`] before [`freeze`](Self::freeze).
    /// * [`HederaError::InvalidState`] once submitted.
    pub fn sign<S: TransactionSigner + ?Sized>(&mut self, signer: &S) -> HederaResult<&mut Self> {
        match self.state {
            TransactionState::Building => return Err(HederaError::NotFrozen),
            TransactionState::Frozen | TransactionState::Signed => {}
            _ => return Err(self.invalid_state("sign")),
        }
        let body_bytes = self
            .body_bytes
            .as_deref()
            .ok_or_else(|| HederaError::Internal("frozen transaction without body bytes".into()))?;

        let signature = match signer.sign_message(body_bytes) {
            Ok(signature) => signature,
            Err(err) => {
                self.state = TransactionState::Failed;
                return Err(err);
            }
        };
        let public_key = signer.public_key_bytes();

        match self
            .signatures
            .iter_mut()
            .find(|pair| pair.public_key == public_key)
        {
            Some(existing) => existing.signature = signature,
            None => self.signatures.push(SignaturePair {
                public_key,
                signature,
            }),
        }
        self.state = TransactionState::Signed;

        if let Some(transaction_id) = &self.transaction_id {
            debug!(
                transaction_id = %transaction_id,
                signatures = self.signatures.len(),
                "transaction signed"
            );
        }
        Ok(self)
    }

    /// Signs with the client's operator key.
    pub fn sign_with_operator(&mut self, client: &Hedera) -> HederaResult<&mut Self> {
        let operator = client.operator().ok_or(HederaError::OperatorNotSet)?;
        self.sign(operator.signer.as_ref())
    }

    /// Checks every attached signature against the frozen body bytes.
    pub fn verify_signatures(&self) -> HederaResult<()> {
        let body_bytes = self.body_bytes.as_deref().ok_or(HederaError::NotFrozen)?;
        self.signatures
            .iter()
            .try_for_each(|pair| pair.verify_ed25519(body_bytes))
    }

    /// True once `public_key` has signed.
    pub fn is_signed_by(&self, public_key: &[u8]) -> bool {
        self.signatures.iter().any(|pair| pair.public_key == public_key)
    }

    /// Returns a fresh `Building` transaction with the same data and settings
    /// but no id, node, signatures or outcome.
    ///
    /// This is how a caller retries an operation on another node after the
    /// original ended in `Failed`: the original stays as it is.
    pub fn rebuild(&self) -> Self {
        Self {
            memo: self.memo.clone(),
            max_transaction_fee: self.max_transaction_fee,
            transaction_valid_duration: self.transaction_valid_duration,
            ..Self::from_data(self.data.clone())
        }
    }

    /// The wire form: body bytes and signatures.
    pub fn to_signed(&self) -> HederaResult<SignedTransaction> {
        let body_bytes = self.body_bytes.clone().ok_or(HederaError::NotFrozen)?;
        Ok(SignedTransaction {
            body_bytes,
            signatures: self.signatures.clone(),
        })
    }

    pub(crate) fn invalid_state(&self, operation: &'static str) -> HederaError {
        HederaError::InvalidState {
            operation,
            state: self.state,
            transaction_id: self.transaction_id,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the kind data.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Returns the memo.
    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Returns the explicitly set fee ceiling.
    pub fn max_transaction_fee(&self) -> Option<Hbar> {
        self.max_transaction_fee
    }

    /// Returns the transaction id: the preset one while building, the
    /// assigned one after freeze.
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    /// Returns the node: the preferred one while building, the designated
    /// one after freeze.
    pub fn node_account_id(&self) -> Option<AccountId> {
        self.node_account_id
    }

    /// Returns the kind, once frozen.
    pub fn kind(&self) -> Option<TransactionKind> {
        self.kind
    }

    /// Returns the frozen body bytes.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body_bytes.as_deref()
    }

    /// Returns the attached signatures.
    pub fn signatures(&self) -> &[SignaturePair] {
        &self.signatures
    }

    /// Returns the receipt, once obtained.
    pub fn receipt(&self) -> Option<&TransactionReceipt> {
        self.receipt.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519PrivateKey;
    use crate::transaction::{AccountCreateTransaction, TransferTransaction};
    use crate::types::Timestamp;

    fn txn_id() -> TransactionId {
        TransactionId::new(AccountId::from_num(2), Timestamp::new(1_700_000_000, 42))
    }

    fn transfer() -> TransferTransaction {
        let mut txn = TransferTransaction::new();
        txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-10))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(10))
            .unwrap();
        txn
    }

    struct FailingSigner;

    impl TransactionSigner for FailingSigner {
        fn public_key_bytes(&self) -> Vec<u8> {
            vec![0; 32]
        }

        fn sign_message(&self, _message: &[u8]) -> HederaResult<Vec<u8>> {
            Err(HederaError::Signing("device unplugged".into()))
        }
    }

    #[test]
    fn test_freeze_assigns_id_and_node() {
        let mut txn = transfer();
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();

        assert_eq!(txn.state(), TransactionState::Frozen);
        assert_eq!(txn.transaction_id(), Some(txn_id()));
        assert_eq!(txn.node_account_id(), Some(AccountId::from_num(3)));
        assert_eq!(txn.kind(), Some(TransactionKind::Transfer));

        let body = TransactionBody::from_bytes(txn.body_bytes().unwrap()).unwrap();
        assert_eq!(body.transaction_fee, DEFAULT_MAX_TRANSACTION_FEE);
        assert_eq!(body.transaction_valid_duration_secs, 120);
    }

    #[test]
    fn test_freeze_twice_fails() {
        let mut txn = transfer();
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();
        let err = txn.freeze(txn_id(), AccountId::from_num(4)).unwrap_err();
        assert!(matches!(
            err,
            HederaError::InvalidState {
                operation: "freeze",
                state: TransactionState::Frozen,
                ..
            }
        ));
        assert_eq!(txn.node_account_id(), Some(AccountId::from_num(3)));
    }

    #[test]
    fn test_incomplete_freeze_leaves_transaction_building() {
        let mut txn = AccountCreateTransaction::new();
        let err = txn.freeze(txn_id(), AccountId::from_num(3)).unwrap_err();
        assert!(matches!(err, HederaError::IncompleteTransaction { field: "key" }));
        assert_eq!(txn.state(), TransactionState::Building);
        assert!(txn.body_bytes().is_none());
        assert!(txn.transaction_id().is_none());
    }

    #[test]
    fn test_setters_fail_after_freeze() {
        let mut txn = transfer();
        txn.set_memo("before").unwrap();
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();
        let bytes = txn.body_bytes().unwrap().to_vec();

        assert!(matches!(
            txn.set_memo("after"),
            Err(HederaError::FrozenTransaction { .. })
        ));
        assert!(matches!(
            txn.set_max_transaction_fee(Hbar::new(9)),
            Err(HederaError::FrozenTransaction { .. })
        ));
        assert!(matches!(
            txn.add_hbar_transfer(AccountId::from_num(5), Hbar::new(1)),
            Err(HederaError::FrozenTransaction { .. })
        ));
        assert_eq!(txn.memo(), "before");
        assert_eq!(txn.body_bytes().unwrap(), bytes.as_slice());
    }

    #[test]
    fn test_sign_before_freeze_fails() {
        let key = Ed25519PrivateKey::generate();
        let mut txn = transfer();
        assert!(matches!(txn.sign(&key), Err(HederaError::NotFrozen)));
        assert_eq!(txn.state(), TransactionState::Building);
        assert!(txn.signatures().is_empty());
    }

    #[test]
    fn test_resigning_replaces_signature() {
        let key1 = Ed25519PrivateKey::generate();
        let key2 = Ed25519PrivateKey::generate();
        let mut txn = transfer();
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();

        txn.sign(&key1).unwrap().sign(&key2).unwrap().sign(&key1).unwrap();
        assert_eq!(txn.signatures().len(), 2);
        assert!(txn.is_signed_by(&key1.public_key_bytes()));
        assert!(txn.is_signed_by(&key2.public_key_bytes()));
        assert!(txn.verify_signatures().is_ok());
    }

    #[test]
    fn test_signer_failure_fails_transaction() {
        let mut txn = transfer();
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();
        assert!(matches!(
            txn.sign(&FailingSigner),
            Err(HederaError::Signing(_))
        ));
        assert_eq!(txn.state(), TransactionState::Failed);

        let key = Ed25519PrivateKey::generate();
        assert!(matches!(
            txn.sign(&key),
            Err(HederaError::InvalidState { operation: "sign", .. })
        ));
    }

    #[test]
    fn test_explicit_fee_and_duration() {
        let mut txn = transfer();
        txn.set_max_transaction_fee(Hbar::new(7))
            .unwrap()
            .set_transaction_valid_duration(Duration::from_secs(30))
            .unwrap();
        assert!(txn.set_max_transaction_fee(-Hbar::new(1)).is_err());
        txn.freeze(txn_id(), AccountId::from_num(3)).unwrap();

        let body = TransactionBody::from_bytes(txn.body_bytes().unwrap()).unwrap();
        assert_eq!(body.transaction_fee, Hbar::new(7));
        assert_eq!(body.transaction_valid_duration_secs, 30);
    }

    #[test]
    fn test_rebuild_starts_over() {
        let key = Ed25519PrivateKey::generate();
        let mut txn = transfer();
        txn.set_memo("again").unwrap();
        txn.freeze(txn_id(), AccountId::from_num(3))
            .unwrap()
            .sign(&key)
            .unwrap();

        let mut fresh = txn.rebuild();
        assert_eq!(fresh.state(), TransactionState::Building);
        assert_eq!(fresh.memo(), "again");
        assert!(fresh.transaction_id().is_none());
        assert!(fresh.signatures().is_empty());

        fresh.freeze(txn_id(), AccountId::from_num(4)).unwrap();
        assert_ne!(fresh.body_bytes(), txn.body_bytes());
        assert_eq!(txn.state(), TransactionState::Signed);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TransactionState::TimedOut.to_string(), "TimedOut");
        assert!(TransactionState::Failed.is_terminal());
        assert!(!TransactionState::Submitted.is_terminal());
    }
}
