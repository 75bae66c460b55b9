//! Signing capability consumed by the transaction engine.

use crate::error::HederaResult;
use std::sync::Arc;

/// Anything that can sign frozen transaction bytes.
///
/// The engine never looks inside the key: it only asks for the public key
/// material to put next to the signature, and for the signature itself.
/// Implementations may live in hardware, a remote service or memory.
pub trait TransactionSigner: Send + Sync {
    /// Returns the public key bytes that verify this signer's signatures.
    fn public_key_bytes(&self) -> Vec<u8>;

    /// Signs `message` and returns the raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying key cannot produce a signature.
    fn sign_message(&self, message: &[u8]) -> HederaResult<Vec<u8>>;
}

impl<T: TransactionSigner + ?Sized> TransactionSigner for Arc<T> {
    fn public_key_bytes(&self) -> Vec<u8> {
        (**self).public_key_bytes()
    }

    fn sign_message(&self, message: &[u8]) -> HederaResult<Vec<u8>> {
        (**self).sign_message(message)
    }
}

impl<T: TransactionSigner + ?Sized> TransactionSigner for &T {
    fn public_key_bytes(&self) -> Vec<u8> {
        (**self).public_key_bytes()
    }

    fn sign_message(&self, message: &[u8]) -> HederaResult<Vec<u8>> {
        (**self).sign_message(message)
    }
}
