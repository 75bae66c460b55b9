//! Wire envelope types.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::{HederaError, HederaResult};
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountId, Hbar, TransactionId};
use serde::{Deserialize, Serialize};

/// The body every signature covers.
///
/// The BCS encoding of a `TransactionBody` is computed exactly once, at
/// freeze time. Two bodies built from the same inputs encode to the same
/// bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Payer account and valid start.
    pub transaction_id: TransactionId,
    /// The one node this body may be submitted to.
    pub node_account_id: AccountId,
    /// Maximum fee the payer agrees to pay.
    pub transaction_fee: Hbar,
    /// Seconds after the valid start during which the transaction is accepted.
    pub transaction_valid_duration_secs: u64,
    /// Free-form memo.
    pub memo: String,
    /// The operation itself.
    pub payload: TransactionPayload,
}

impl TransactionBody {
    /// Serializes this body to BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_bytes(&self) -> HederaResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(HederaError::bcs)
    }

    /// Decodes a body from BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid body.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        bcs::from_bytes(bytes).map_err(HederaError::bcs)
    }
}

/// A public key together with its signature over the body bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    /// Public key bytes of the signer.
    #[serde(with = "serde_bytes")]
    pub public_key: Vec<u8>,
    /// Signature bytes.
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl SignaturePair {
    /// Verifies this pair as an Ed25519 signature over `message`.
    pub fn verify_ed25519(&self, message: &[u8]) -> HederaResult<()> {
        let public_key = Ed25519PublicKey::from_bytes(&self.public_key)?;
        let signature = Ed25519Signature::from_bytes(&self.signature)?;
        public_key.verify(message, &signature)
    }
}

/// What actually goes over the wire: the frozen body bytes plus signatures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// BCS-encoded [`TransactionBody`], exactly as signed.
    #[serde(with = "serde_bytes")]
    pub body_bytes: Vec<u8>,
    /// Signatures over `body_bytes`.
    pub signatures: Vec<SignaturePair>,
}

impl SignedTransaction {
    /// Serializes the signed transaction to BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_bytes(&self) -> HederaResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(HederaError::bcs)
    }

    /// Decodes a signed transaction from BCS bytes.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        bcs::from_bytes(bytes).map_err(HederaError::bcs)
    }

    /// Decodes the body.
    pub fn body(&self) -> HederaResult<TransactionBody> {
        TransactionBody::from_bytes(&self.body_bytes)
    }

    /// Verifies every signature against the body bytes.
    pub fn verify_signatures(&self) -> HederaResult<()> {
        self.signatures
            .iter()
            .try_for_each(|pair| pair.verify_ed25519(&self.body_bytes))
    }
}
