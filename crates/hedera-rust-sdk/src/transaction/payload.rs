//! Operation-specific transaction payloads.
//!
//! Every transaction kind the SDK can submit is one variant of
//! [`TransactionPayload`]. The variant is produced once, at freeze time, by
//! the kind's [`TransactionData`](super::TransactionData) and then BCS-encoded
//! inside the [`TransactionBody`](super::TransactionBody).

use crate::types::{AccountId, Hbar, TokenId, TopicId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An hbar adjustment for one account. Debits are negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HbarTransfer {
    /// The account whose balance changes.
    pub account_id: AccountId,
    /// Signed amount.
    pub amount: Hbar,
}

/// A fungible token adjustment for one account, in the token's smallest unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    /// The token being moved.
    pub token_id: TokenId,
    /// The account whose balance changes.
    pub account_id: AccountId,
    /// Signed amount.
    pub amount: i64,
}

/// The closed set of operations a transaction can carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// Create a new account.
    AccountCreate {
        /// Public key that controls the account.
        #[serde(with = "serde_bytes")]
        key: Vec<u8>,
        /// Amount moved from the payer into the new account.
        initial_balance: Hbar,
        /// Whether incoming transfers need the account's signature.
        receiver_signature_required: bool,
        /// Seconds between automatic renewals.
        auto_renew_period_secs: u64,
        /// Memo stored on the account.
        account_memo: String,
    },
    /// Move hbar and fungible tokens between accounts.
    Transfer {
        /// Hbar adjustments, netting to zero.
        hbar_transfers: Vec<HbarTransfer>,
        /// Token adjustments, netting to zero per token.
        token_transfers: Vec<TokenTransfer>,
    },
    /// Associate tokens with an account.
    TokenAssociate {
        /// The account to associate.
        account_id: AccountId,
        /// The tokens to associate it with.
        token_ids: Vec<TokenId>,
    },
    /// Delete a token.
    TokenDelete {
        /// The token to delete.
        token_id: TokenId,
    },
    /// Create a consensus topic.
    TopicCreate {
        /// Memo stored on the topic.
        topic_memo: String,
        /// Key allowed to update or delete the topic.
        #[serde(with = "serde_bytes")]
        admin_key: Vec<u8>,
        /// Key required to submit messages. Empty means open submission.
        #[serde(with = "serde_bytes")]
        submit_key: Vec<u8>,
        /// Seconds between automatic renewals.
        auto_renew_period_secs: u64,
    },
    /// Submit a message to a topic.
    TopicMessageSubmit {
        /// The target topic.
        topic_id: TopicId,
        /// Message bytes.
        #[serde(with = "serde_bytes")]
        message: Vec<u8>,
    },
    /// Delete a topic.
    TopicDelete {
        /// The topic to delete.
        topic_id: TopicId,
    },
}

impl TransactionPayload {
    /// Returns the kind of this payload.
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::AccountCreate { .. } => TransactionKind::AccountCreate,
            Self::Transfer { .. } => TransactionKind::Transfer,
            Self::TokenAssociate { .. } => TransactionKind::TokenAssociate,
            Self::TokenDelete { .. } => TransactionKind::TokenDelete,
            Self::TopicCreate { .. } => TransactionKind::TopicCreate,
            Self::TopicMessageSubmit { .. } => TransactionKind::TopicMessageSubmit,
            Self::TopicDelete { .. } => TransactionKind::TopicDelete,
        }
    }
}

/// Identifies which submission RPC a transaction goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// `crypto/createAccount`
    AccountCreate,
    /// `crypto/cryptoTransfer`
    Transfer,
    /// `token/associateTokens`
    TokenAssociate,
    /// `token/deleteToken`
    TokenDelete,
    /// `consensus/createTopic`
    TopicCreate,
    /// `consensus/submitMessage`
    TopicMessageSubmit,
    /// `consensus/deleteTopic`
    TopicDelete,
}

impl TransactionKind {
    /// The service that hosts this kind's RPC.
    pub const fn service(self) -> &'static str {
        match self {
            Self::AccountCreate | Self::Transfer => "crypto",
            Self::TokenAssociate | Self::TokenDelete => "token",
            Self::TopicCreate | Self::TopicMessageSubmit | Self::TopicDelete => "consensus",
        }
    }

    /// The RPC method name.
    pub const fn method(self) -> &'static str {
        match self {
            Self::AccountCreate => "createAccount",
            Self::Transfer => "cryptoTransfer",
            Self::TokenAssociate => "associateTokens",
            Self::TokenDelete => "deleteToken",
            Self::TopicCreate => "createTopic",
            Self::TopicMessageSubmit => "submitMessage",
            Self::TopicDelete => "deleteTopic",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service(), self.method())
    }
}
