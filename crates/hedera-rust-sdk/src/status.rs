//! Network response codes.
//!
//! Nodes answer both precheck and receipt queries with an integer status code.
//! [`ResponseStatus`] maps those codes onto symbolic names, and
//! [`ResponseStatus::class`] reduces them to the three outcomes the engine
//! acts on. Codes missing from the table decode to
//! [`ResponseStatus::UnknownStatus`] instead of failing.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// How the engine reacts to a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Accepted (precheck) or applied (receipt).
    Success,
    /// Transient; ask again later.
    Retryable,
    /// Final and unsuccessful.
    TerminalFailure,
}

macro_rules! response_statuses {
    ($($(#[$doc:meta])* $variant:ident = $code:literal => $name:literal,)+) => {
        /// A status code returned by a node.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ResponseStatus {
            $(
                $(#[$doc])*
                #[doc = concat!("`", $name, "` (", stringify!($code), ")")]
                $variant,
            )+
            /// A code that is not in the static table.
            UnknownStatus(i32),
        }

        const STATUS_TABLE: &[(ResponseStatus, &str)] = &[
            $((ResponseStatus::$variant, $name),)+
        ];

        impl ResponseStatus {
            /// Decodes an integer code. Never fails.
            pub const fn from_code(code: i32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::UnknownStatus(other),
                }
            }

            /// Returns the integer code.
            pub const fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::UnknownStatus(code) => code,
                }
            }

            /// Returns the symbolic name, e.g. `INSUFFICIENT_PAYER_BALANCE`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::UnknownStatus(_) => "UNKNOWN_STATUS",
                }
            }
        }
    };
}

response_statuses! {
    /// The transaction passed precheck.
    Ok = 0 => "OK",
    InvalidTransaction = 1 => "INVALID_TRANSACTION",
    PayerAccountNotFound = 2 => "PAYER_ACCOUNT_NOT_FOUND",
    InvalidNodeAccount = 3 => "INVALID_NODE_ACCOUNT",
    TransactionExpired = 4 => "TRANSACTION_EXPIRED",
    InvalidTransactionStart = 5 => "INVALID_TRANSACTION_START",
    InvalidTransactionDuration = 6 => "INVALID_TRANSACTION_DURATION",
    InvalidSignature = 7 => "INVALID_SIGNATURE",
    MemoTooLong = 8 => "MEMO_TOO_LONG",
    InsufficientTxFee = 9 => "INSUFFICIENT_TX_FEE",
    InsufficientPayerBalance = 10 => "INSUFFICIENT_PAYER_BALANCE",
    DuplicateTransaction = 11 => "DUPLICATE_TRANSACTION",
    /// The node is overloaded.
    Busy = 12 => "BUSY",
    NotSupported = 13 => "NOT_SUPPORTED",
    InvalidFileId = 14 => "INVALID_FILE_ID",
    InvalidAccountId = 15 => "INVALID_ACCOUNT_ID",
    InvalidContractId = 16 => "INVALID_CONTRACT_ID",
    InvalidTransactionId = 17 => "INVALID_TRANSACTION_ID",
    /// The network has no record of the transaction id.
    ReceiptNotFound = 18 => "RECEIPT_NOT_FOUND",
    RecordNotFound = 19 => "RECORD_NOT_FOUND",
    InvalidSolidityId = 20 => "INVALID_SOLIDITY_ID",
    /// Consensus has not been reached yet.
    Unknown = 21 => "UNKNOWN",
    /// The transaction was applied.
    Success = 22 => "SUCCESS",
    FailInvalid = 23 => "FAIL_INVALID",
    FailFee = 24 => "FAIL_FEE",
    FailBalance = 25 => "FAIL_BALANCE",
    KeyRequired = 26 => "KEY_REQUIRED",
    BadEncoding = 27 => "BAD_ENCODING",
    InsufficientAccountBalance = 28 => "INSUFFICIENT_ACCOUNT_BALANCE",
    InvalidSolidityAddress = 29 => "INVALID_SOLIDITY_ADDRESS",
    InsufficientGas = 30 => "INSUFFICIENT_GAS",
    InvalidPayerSignature = 43 => "INVALID_PAYER_SIGNATURE",
    InvalidAccountAmounts = 48 => "INVALID_ACCOUNT_AMOUNTS",
    InvalidTopicId = 150 => "INVALID_TOPIC_ID",
    InvalidTokenId = 167 => "INVALID_TOKEN_ID",
    TokenNotAssociatedToAccount = 184 => "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT",
    TokenAlreadyAssociatedToAccount = 194 => "TOKEN_ALREADY_ASSOCIATED_TO_ACCOUNT",
}

static STATUS_BY_NAME: Lazy<HashMap<&'static str, ResponseStatus>> = Lazy::new(|| {
    STATUS_TABLE
        .iter()
        .map(|(status, name)| (*name, *status))
        .collect()
});

impl ResponseStatus {
    /// Looks up a status by its symbolic name.
    pub fn from_name(name: &str) -> Option<Self> {
        STATUS_BY_NAME.get(name).copied()
    }

    /// Every status in the static table.
    pub fn known() -> impl Iterator<Item = ResponseStatus> {
        STATUS_TABLE.iter().map(|(status, _)| *status)
    }

    /// Classifies this status. Unrecognized codes are terminal.
    pub const fn class(self) -> StatusClass {
        match self {
            Self::Ok | Self::Success => StatusClass::Success,
            Self::Busy | Self::Unknown => StatusClass::Retryable,
            _ => StatusClass::TerminalFailure,
        }
    }

    /// Shorthand for `class() == StatusClass::Success`.
    pub const fn is_success(self) -> bool {
        matches!(self.class(), StatusClass::Success)
    }

    /// Shorthand for `class() == StatusClass::Retryable`.
    pub const fn is_retryable(self) -> bool {
        matches!(self.class(), StatusClass::Retryable)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatus(code) => write!(f, "UNKNOWN_STATUS({code})"),
            other => f.write_str(other.name()),
        }
    }
}

impl From<i32> for ResponseStatus {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ResponseStatus> for i32 {
    fn from(status: ResponseStatus) -> Self {
        status.code()
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::from_code)
    }
}
