//! Entity identifiers.
//!
//! Accounts, tokens and topics are all addressed by a `shard.realm.num`
//! triplet. The text form is what users type; the binary form is the BCS
//! encoding of the three fields and is what ends up inside signed bodies.

use crate::error::{HederaError, HederaResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of the binary form in bytes.
pub const ENTITY_ID_LENGTH: usize = 24;

/// A `shard.realm.num` identifier of a ledger object.
///
/// # Example
///
/// ```rust
/// use hedera_rust_sdk::types::EntityId;
///
/// let id: EntityId = "0.0.1001".parse().unwrap();
/// assert_eq!(id, EntityId::new(0, 0, 1001));
/// assert_eq!(id.to_string(), "0.0.1001");
///
/// let bytes = id.to_bytes().unwrap();
/// assert_eq!(EntityId::from_bytes(&bytes).unwrap(), id);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Entity number within the realm.
    pub num: u64,
}

/// An account identifier.
pub type AccountId = EntityId;
/// A token identifier.
pub type TokenId = EntityId;
/// A consensus topic identifier.
pub type TopicId = EntityId;

impl EntityId {
    /// Creates an identifier from its three components.
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Shorthand for `0.0.num`.
    pub const fn from_num(num: u64) -> Self {
        Self::new(0, 0, num)
    }

    /// Serializes the identifier to its binary form.
    pub fn to_bytes(&self) -> HederaResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(HederaError::bcs)
    }

    /// Parses the binary form. Rejects short input and trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        if bytes.len() != ENTITY_ID_LENGTH {
            return Err(HederaError::MalformedIdentifier(format!(
                "expected {} bytes, got {}",
                ENTITY_ID_LENGTH,
                bytes.len()
            )));
        }
        bcs::from_bytes(bytes).map_err(|e| HederaError::MalformedIdentifier(e.to_string()))
    }

    fn parse_component(part: &str, text: &str) -> HederaResult<u64> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HederaError::MalformedIdentifier(format!(
                "'{text}' is not of the form shard.realm.num"
            )));
        }
        part.parse()
            .map_err(|_| HederaError::MalformedIdentifier(format!("'{part}' is out of range")))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({self})")
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = HederaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 3 {
            return Err(HederaError::MalformedIdentifier(format!(
                "'{text}' is not of the form shard.realm.num"
            )));
        }
        Ok(Self {
            shard: Self::parse_component(parts[0], text)?,
            realm: Self::parse_component(parts[1], text)?,
            num: Self::parse_component(parts[2], text)?,
        })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (self.shard, self.realm, self.num).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let (shard, realm, num) = <(u64, u64, u64)>::deserialize(deserializer)?;
            Ok(Self { shard, realm, num })
        }
    }
}

impl From<(u64, u64, u64)> for EntityId {
    fn from((shard, realm, num): (u64, u64, u64)) -> Self {
        Self::new(shard, realm, num)
    }
}
