//! Error types for the Hedera SDK.
//!
//! Every fallible operation in the crate returns [`HederaResult`]. Variants are
//! grouped into the coarse categories of [`ErrorKind`], which is what callers
//! should branch on when deciding whether a failure can be corrected, retried
//! or must simply be reported.

use crate::status::ResponseStatus;
use crate::transaction::TransactionState;
use crate::types::{AccountId, TransactionId};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A specialized Result type for Hedera SDK operations.
pub type HederaResult<T> = Result<T, HederaError>;

/// Coarse classification of a [`HederaError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Incomplete or invalid input, detected before anything is sent.
    /// Fixable by the caller and never retried automatically.
    Validation,
    /// An operation was called in the wrong lifecycle state.
    State,
    /// A node could not be reached or answered with a transport error.
    Network,
    /// A node rejected the transaction at precheck.
    PrecheckRejection,
    /// The transaction reached consensus but did not succeed.
    ReceiptFailure,
    /// The outcome is still unknown after the allotted wait.
    ReceiptTimeout,
    /// Encoding corruption or another condition that should not happen.
    Internal,
}

/// The main error type for the Hedera SDK.
#[derive(Error, Debug)]
pub enum HederaError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during BCS serialization/deserialization
    #[error("BCS error: {0}")]
    Bcs(String),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Text or bytes that do not form a valid identifier
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// A signer could not produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// A required field was not set before freezing
    #[error("Incomplete transaction: {field} is required")]
    IncompleteTransaction {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The transaction fields are set but inconsistent
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// An operation was attempted in a state that does not allow it
    #[error("Cannot {operation} a transaction in state {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the transaction was in.
        state: TransactionState,
        /// The transaction id, once assigned.
        transaction_id: Option<TransactionId>,
    },

    /// A setter was called after the transaction was frozen
    #[error("Transaction {transaction_id} is frozen and can no longer be modified")]
    FrozenTransaction {
        /// The id assigned at freeze time.
        transaction_id: TransactionId,
    },

    /// Signing or submission was attempted before freezing
    #[error("Transaction must be frozen first")]
    NotFrozen,

    /// The operator has not signed the transaction
    #[error("Transaction {transaction_id} is missing the operator signature")]
    MissingOperatorSignature {
        /// The transaction lacking the signature.
        transaction_id: TransactionId,
    },

    /// The client has no operator configured
    #[error("No operator configured on the client")]
    OperatorNotSet,

    /// A channel to a node failed
    #[error("Channel error for node {node}: {message}")]
    Channel {
        /// The node the channel points at.
        node: AccountId,
        /// Transport-level description.
        message: String,
    },

    /// A node account id that is not in the address book
    #[error("Unknown node: {0}")]
    UnknownNode(AccountId),

    /// Every node in the address book is cooling down
    #[error("No healthy nodes available")]
    NoHealthyNodes,

    /// Submission kept failing with retryable outcomes
    #[error("Node {node} unavailable for transaction {transaction_id} after {attempts} attempts")]
    NodeUnavailable {
        /// The designated node.
        node: AccountId,
        /// The transaction being submitted.
        transaction_id: TransactionId,
        /// How many submissions were made.
        attempts: u32,
        /// The last precheck status, when the node answered at all.
        last_status: Option<ResponseStatus>,
    },

    /// The node rejected the transaction at precheck
    #[error("Transaction {transaction_id} rejected by node {node} at precheck: {status}")]
    TransactionRejected {
        /// The precheck status.
        status: ResponseStatus,
        /// The rejected transaction.
        transaction_id: TransactionId,
        /// The node that rejected it.
        node: AccountId,
    },

    /// The transaction reached consensus with a failure status
    #[error("Transaction {transaction_id} failed: {status}")]
    ReceiptFailed {
        /// The receipt status.
        status: ResponseStatus,
        /// The failed transaction.
        transaction_id: TransactionId,
    },

    /// The network does not know the transaction
    #[error("Receipt not found for transaction {transaction_id}")]
    ReceiptNotFound {
        /// The transaction that was looked up.
        transaction_id: TransactionId,
    },

    /// The receipt did not become available in time
    #[error("Timed out after {timeout:?} waiting for the receipt of {transaction_id}")]
    ReceiptTimeout {
        /// The transaction whose outcome is unknown.
        transaction_id: TransactionId,
        /// How long we waited.
        timeout: Duration,
    },

    /// A node gateway answered with a non-success HTTP status
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the gateway
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal SDK error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &["private_key", "secret", "seed", "authorization"];

impl HederaError {
    /// Creates a new BCS error
    pub fn bcs<E: fmt::Display>(err: E) -> Self {
        Self::Bcs(err.to_string())
    }

    /// Creates a new channel error for the given node
    pub fn channel(node: AccountId, message: impl Into<String>) -> Self {
        Self::Channel {
            node,
            message: message.into(),
        }
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedIdentifier(_)
            | Self::InvalidPublicKey(_)
            | Self::InvalidPrivateKey(_)
            | Self::IncompleteTransaction { .. }
            | Self::InvalidTransaction(_)
            | Self::Hex(_)
            | Self::Url(_)
            | Self::Config(_)
            | Self::UnknownNode(_)
            | Self::OperatorNotSet => ErrorKind::Validation,
            Self::InvalidState { .. }
            | Self::FrozenTransaction { .. }
            | Self::NotFrozen
            | Self::MissingOperatorSignature { .. }
            | Self::SignatureVerificationFailed
            | Self::Signing(_) => ErrorKind::State,
            Self::Http(_)
            | Self::Channel { .. }
            | Self::NoHealthyNodes
            | Self::NodeUnavailable { .. }
            | Self::Api { .. } => ErrorKind::Network,
            Self::TransactionRejected { .. } => ErrorKind::PrecheckRejection,
            Self::ReceiptFailed { .. } | Self::ReceiptNotFound { .. } => {
                ErrorKind::ReceiptFailure
            }
            Self::ReceiptTimeout { .. } => ErrorKind::ReceiptTimeout,
            Self::Json(_) | Self::Bcs(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the transaction id attached to this error, if any.
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            Self::InvalidState { transaction_id, .. } => transaction_id.as_ref(),
            Self::FrozenTransaction { transaction_id }
            | Self::MissingOperatorSignature { transaction_id }
            | Self::NodeUnavailable { transaction_id, .. }
            | Self::TransactionRejected { transaction_id, .. }
            | Self::ReceiptFailed { transaction_id, .. }
            | Self::ReceiptNotFound { transaction_id }
            | Self::ReceiptTimeout { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    /// Returns the network status attached to this error, if any.
    pub fn status(&self) -> Option<ResponseStatus> {
        match self {
            Self::TransactionRejected { status, .. } | Self::ReceiptFailed { status, .. } => {
                Some(*status)
            }
            Self::NodeUnavailable { last_status, .. } => *last_status,
            Self::ReceiptNotFound { .. } => Some(ResponseStatus::ReceiptNotFound),
            _ => None,
        }
    }

    /// Returns true if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReceiptTimeout { .. })
    }

    /// Returns true if this is a transient transport error that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Channel { .. } => true,
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are removed, very long messages are truncated and
    /// messages that look like they carry key material are redacted.
    pub fn sanitized_message(&self) -> String {
        Self::sanitize_string(&self.to_string())
    }

    fn sanitize_string(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            let mut end = MAX_ERROR_MESSAGE_LENGTH;
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..end],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityId, Timestamp};

    fn txn_id() -> TransactionId {
        TransactionId::new(EntityId::new(0, 0, 2), Timestamp::new(1_700_000_000, 5))
    }

    #[test]
    fn test_error_display() {
        let err = HederaError::MalformedIdentifier("0.0".to_string());
        assert_eq!(err.to_string(), "Malformed identifier: 0.0");

        let err = HederaError::IncompleteTransaction { field: "account_id" };
        assert_eq!(
            err.to_string(),
            "Incomplete transaction: account_id is required"
        );
    }

    #[test]
    fn test_status_is_displayed_by_name() {
        let err = HederaError::TransactionRejected {
            status: ResponseStatus::InsufficientPayerBalance,
            transaction_id: txn_id(),
            node: EntityId::new(0, 0, 3),
        };
        let msg = err.to_string();
        assert!(msg.contains("INSUFFICIENT_PAYER_BALANCE"));
        assert!(msg.contains("0.0.2@1700000000.000000005"));
        assert!(msg.contains("0.0.3"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            HederaError::IncompleteTransaction { field: "key" }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(HederaError::NotFrozen.kind(), ErrorKind::State);
        assert_eq!(
            HederaError::FrozenTransaction {
                transaction_id: txn_id()
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            HederaError::channel(EntityId::new(0, 0, 3), "refused").kind(),
            ErrorKind::Network
        );
        assert_eq!(
            HederaError::ReceiptFailed {
                status: ResponseStatus::InvalidSignature,
                transaction_id: txn_id(),
            }
            .kind(),
            ErrorKind::ReceiptFailure
        );
        let timeout = HederaError::ReceiptTimeout {
            transaction_id: txn_id(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timeout.kind(), ErrorKind::ReceiptTimeout);
        assert!(timeout.is_timeout());
    }

    #[test]
    fn test_transaction_id_and_status_accessors() {
        let err = HederaError::ReceiptFailed {
            status: ResponseStatus::DuplicateTransaction,
            transaction_id: txn_id(),
        };
        assert_eq!(err.transaction_id(), Some(&txn_id()));
        assert_eq!(err.status(), Some(ResponseStatus::DuplicateTransaction));

        assert_eq!(HederaError::NotFrozen.transaction_id(), None);
        assert_eq!(HederaError::NotFrozen.status(), None);
    }

    #[test]
    fn test_is_retryable() {
        assert!(HederaError::api(429, "rate limited").is_retryable());
        assert!(HederaError::api(503, "unavailable").is_retryable());
        assert!(!HederaError::api(400, "bad request").is_retryable());
        assert!(HederaError::channel(EntityId::new(0, 0, 4), "reset").is_retryable());
        assert!(!HederaError::NoHealthyNodes.is_retryable());
    }

    #[test]
    fn test_sanitized_message() {
        let err = HederaError::api(500, "x".repeat(2000));
        let sanitized = err.sanitized_message();
        assert!(sanitized.len() < 1200);
        assert!(sanitized.contains("truncated"));

        let err = HederaError::api(400, "bad\x00request\x1f");
        let sanitized = err.sanitized_message();
        assert!(!sanitized.contains('\x00'));
        assert!(!sanitized.contains('\x1f'));

        let err = HederaError::Internal("private_key: abc123".to_string());
        let sanitized = err.sanitized_message();
        assert!(sanitized.contains("REDACTED"));
        assert!(!sanitized.contains("abc123"));
    }
}
