//! Transaction identifiers and valid-start timestamps.

use crate::error::{HederaError, HederaResult};
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A point in time with nanosecond precision, relative to the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Whole seconds.
    pub seconds: i64,
    /// Nanoseconds within the second, always below one billion.
    pub nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp. `nanos` overflowing a second is carried into `seconds`.
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds + (nanos / 1_000_000_000) as i64,
            nanos: nanos % 1_000_000_000,
        }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::new(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
    }

    /// Builds a timestamp from nanoseconds since the epoch.
    pub const fn from_unix_nanos(nanos: i64) -> Self {
        Self {
            seconds: nanos.div_euclid(NANOS_PER_SECOND),
            nanos: nanos.rem_euclid(NANOS_PER_SECOND) as u32,
        }
    }

    /// Nanoseconds since the epoch, saturating at the `i64` range.
    pub const fn as_unix_nanos(&self) -> i64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(self.nanos as i64)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Identifies one transaction: the paying account plus its valid-start time.
///
/// The text form is `payer@seconds.nanos`, e.g. `0.0.2@1700000000.000000001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId {
    /// The payer.
    pub account_id: AccountId,
    /// The start of the validity window.
    pub valid_start: Timestamp,
}

impl TransactionId {
    /// Creates a transaction id.
    pub const fn new(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self {
            account_id,
            valid_start,
        }
    }

    /// Serializes the id to its binary form.
    pub fn to_bytes(&self) -> HederaResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(HederaError::bcs)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.valid_start)
    }
}

impl FromStr for TransactionId {
    type Err = HederaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            HederaError::MalformedIdentifier(format!(
                "'{s}' is not of the form shard.realm.num@seconds.nanos"
            ))
        };

        let (account, start) = s.trim().split_once('@').ok_or_else(malformed)?;
        let account_id: AccountId = account.parse()?;
        let (seconds, nanos) = start.split_once('.').ok_or_else(malformed)?;

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(seconds) || !digits(nanos) || nanos.len() > 9 {
            return Err(malformed());
        }
        let seconds: i64 = seconds.parse().map_err(|_| malformed())?;
        let nanos: u32 = nanos.parse().map_err(|_| malformed())?;

        Ok(Self::new(account_id, Timestamp::new(seconds, nanos)))
    }
}

/// Allocates valid-start timestamps that never repeat within the process.
///
/// Each call returns the current time in nanoseconds, bumped past the
/// previously issued value when the clock has not advanced (or went
/// backwards). Two transactions frozen by the same client therefore never
/// share an id, even for the same payer.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    last_nanos: AtomicI64,
}

impl TransactionIdGenerator {
    /// Creates a generator.
    pub const fn new() -> Self {
        Self {
            last_nanos: AtomicI64::new(0),
        }
    }

    /// Returns a fresh id for `payer`.
    pub fn generate(&self, payer: AccountId) -> TransactionId {
        TransactionId::new(payer, self.next_valid_start())
    }

    /// Returns the next valid-start timestamp.
    pub fn next_valid_start(&self) -> Timestamp {
        let now = Timestamp::now().as_unix_nanos();
        let next = |last: i64| now.max(last.saturating_add(1));
        let last = self
            .last_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
            .unwrap_or_else(|last| last);
        Timestamp::from_unix_nanos(next(last))
    }
}
