//! Per-kind transaction builders.
//!
//! Each kind keeps its fields in a `*Data` struct implementing
//! [`TransactionData`]; its setters live on `Transaction<*Data>` so that the
//! lifecycle's frozen check guards every one of them.

mod account;
mod token;
mod topic;
mod transfer;

pub use account::{AccountCreateData, AccountCreateTransaction, DEFAULT_AUTO_RENEW_PERIOD};
pub use token::{
    TokenAssociateData, TokenAssociateTransaction, TokenDeleteData, TokenDeleteTransaction,
    TOKEN_ASSOCIATE_DEFAULT_FEE,
};
pub use topic::{
    TopicCreateData, TopicCreateTransaction, TopicDeleteData, TopicDeleteTransaction,
    TopicMessageSubmitData, TopicMessageSubmitTransaction, MAX_TOPIC_MESSAGE_LENGTH,
};
pub use transfer::{TransferData, TransferTransaction};

use crate::error::{HederaError, HederaResult};
use crate::transaction::payload::TransactionPayload;
use crate::types::Hbar;
use std::fmt::Debug;

/// Maximum memo length in bytes.
pub const MAX_MEMO_LENGTH: usize = 100;

/// Builds the operation-specific part of a transaction.
///
/// The engine calls [`build_payload`](Self::build_payload) exactly once, when
/// the transaction is frozen.
pub trait TransactionData: Clone + Debug + Send + Sync + 'static {
    /// Validates the fields and assembles the payload.
    ///
    /// # Errors
    ///
    /// [`HederaError::IncompleteTransaction`] naming the first missing field,
    /// or [`HederaError::InvalidTransaction`] for inconsistent fields.
    fn build_payload(&self) -> HederaResult<TransactionPayload>;

    /// Fee ceiling used when the caller does not set one. `None` defers to
    /// the client default.
    fn default_max_transaction_fee(&self) -> Option<Hbar> {
        None
    }
}

pub(crate) fn validate_memo(field: &'static str, memo: &str) -> HederaResult<()> {
    if memo.len() > MAX_MEMO_LENGTH {
        return Err(HederaError::InvalidTransaction(format!(
            "{field} is {} bytes, at most {MAX_MEMO_LENGTH} allowed",
            memo.len()
        )));
    }
    if memo.contains('\0') {
        return Err(HederaError::InvalidTransaction(format!(
            "{field} must not contain NUL bytes"
        )));
    }
    Ok(())
}
