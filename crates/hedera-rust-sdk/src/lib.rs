//! # Hedera Rust SDK
//!
//! A client-side transaction engine for Hedera-style ledgers.
//!
//! Transactions are built field by field, frozen into canonical body bytes
//! bound to one node, signed by any number of keys, submitted with retries
//! on transient failures and finally resolved by polling for their receipt.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hedera_rust_sdk::{Hedera, HederaConfig};
//! use hedera_rust_sdk::crypto::Ed25519PrivateKey;
//! use hedera_rust_sdk::transaction::AccountCreateTransaction;
//! use hedera_rust_sdk::types::{AccountId, Hbar};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = Hedera::testnet()?;
//!     client.set_operator(AccountId::from_num(1001), operator_key);
//!
//!     let new_key = Ed25519PrivateKey::generate();
//!     let mut create = AccountCreateTransaction::new();
//!     create
//!         .set_key(new_key.public_key())?
//!         .set_initial_balance(Hbar::new(10))?;
//!
//!     let receipt = create
//!         .freeze_with(&client)?
//!         .sign_with_operator(&client)?
//!         .execute(&client)
//!         .await?;
//!     println!("created {:?}", receipt.account_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`transaction`] - Transaction kinds, lifecycle and execution
//! - [`network`] - Node selection and channels
//! - [`poller`] - Receipt polling
//! - [`crypto`] - Ed25519 keys and the signer seam
//! - [`status`] - Network response codes
//! - [`types`] - Entity ids, transaction ids and amounts
//! - [`config`] - Client configuration and network presets
//! - [`retry`] - Retry policy with exponential backoff

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod network;
pub mod poller;
pub mod retry;
pub mod status;
pub mod transaction;
pub mod types;

mod hedera;

// Re-export main entry points
pub use config::HederaConfig;
pub use error::{ErrorKind, HederaError, HederaResult};
pub use hedera::{Hedera, Operator};

// Re-export commonly used types
pub use status::{ResponseStatus, StatusClass};
pub use types::{AccountId, TransactionId};
