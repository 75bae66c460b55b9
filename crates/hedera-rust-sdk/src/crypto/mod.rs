//! Key and signature providers.
//!
//! The transaction engine only depends on the [`TransactionSigner`] trait.
//! [`Ed25519PrivateKey`] is the in-memory implementation shipped with the SDK.

mod ed25519;
mod traits;

pub use ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, ED25519_PRIVATE_KEY_LENGTH,
    ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};
pub use traits::TransactionSigner;
