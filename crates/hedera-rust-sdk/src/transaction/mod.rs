//! Transactions: building, freezing, signing and execution.
//!
//! Every kind shares the lifecycle of [`Transaction`]; the kind-specific
//! fields live in a [`TransactionData`] implementation. The aliases such as
//! [`TransferTransaction`] are what callers normally use.

mod data;
mod execute;
mod lifecycle;
mod payload;
mod receipt;
mod types;

pub use data::{
    AccountCreateData, AccountCreateTransaction, TokenAssociateData, TokenAssociateTransaction,
    TokenDeleteData, TokenDeleteTransaction, TopicCreateData, TopicCreateTransaction,
    TopicDeleteData, TopicDeleteTransaction, TopicMessageSubmitData,
    TopicMessageSubmitTransaction, TransactionData, TransferData, TransferTransaction,
    DEFAULT_AUTO_RENEW_PERIOD, MAX_MEMO_LENGTH, MAX_TOPIC_MESSAGE_LENGTH,
    TOKEN_ASSOCIATE_DEFAULT_FEE,
};
pub use lifecycle::{Transaction, TransactionState};
pub use payload::{HbarTransfer, TokenTransfer, TransactionKind, TransactionPayload};
pub use receipt::TransactionReceipt;
pub use types::{SignaturePair, SignedTransaction, TransactionBody};
