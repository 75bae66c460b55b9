//! Core ledger types.
//!
//! - [`EntityId`] and its aliases [`AccountId`], [`TokenId`], [`TopicId`]
//! - [`TransactionId`] and [`Timestamp`]
//! - [`Hbar`] amounts

mod entity_id;
mod hbar;
mod transaction_id;

pub use entity_id::{AccountId, EntityId, TokenId, TopicId, ENTITY_ID_LENGTH};
pub use hbar::{Hbar, TINYBARS_PER_HBAR};
pub use transaction_id::{Timestamp, TransactionId, TransactionIdGenerator};
