//! Ed25519 keys as used by Hedera accounts.
//!
//! Keys travel either as raw 32-byte values or wrapped in the DER envelopes
//! that the Hedera portal and other SDKs print (PKCS#8 for private keys,
//! SubjectPublicKeyInfo for public keys). Both parse to the same key.

use crate::crypto::traits::TransactionSigner;
use crate::error::{HederaError, HederaResult};
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

/// Ed25519 private key length in bytes.
pub const ED25519_PRIVATE_KEY_LENGTH: usize = 32;
/// Ed25519 public key length in bytes.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;
/// Ed25519 signature length in bytes.
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

/// PKCS#8 `PrivateKeyInfo` header for an Ed25519 seed.
const PRIVATE_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];
/// `SubjectPublicKeyInfo` header for an Ed25519 public key.
const PUBLIC_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Returns the raw key inside `bytes`, which is either the raw key itself or
/// the key behind `prefix`.
fn unwrap_der<'a, const N: usize>(bytes: &'a [u8], prefix: &[u8]) -> Option<&'a [u8; N]> {
    let raw = match bytes.strip_prefix(prefix) {
        Some(rest) if bytes.len() == prefix.len() + N => rest,
        _ => bytes,
    };
    raw.try_into().ok()
}

fn decode_hex(s: &str) -> HederaResult<Zeroizing<Vec<u8>>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(Zeroizing::new(hex::decode(s)?))
}

/// An Ed25519 private key.
///
/// The seed is wiped from memory on drop and never shows up in `Debug`
/// output.
///
/// # Example
///
/// ```rust
/// use hedera_rust_sdk::crypto::Ed25519PrivateKey;
///
/// let key: Ed25519PrivateKey =
///     "302e020100300506032b65700422042091132178e72057a1d7528025956fe39b0b847f200ab59b2fdd367017f3087137"
///         .parse()
///         .unwrap();
/// let signature = key.sign(b"hello");
/// assert!(key.public_key().verify(b"hello", &signature).is_ok());
/// ```
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    signing: SigningKey,
}

impl Ed25519PrivateKey {
    /// Generates a fresh key from the operating system's RNG.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Reads a key from its 32-byte seed or its 48-byte PKCS#8 encoding.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        let mut seed = *unwrap_der::<ED25519_PRIVATE_KEY_LENGTH>(bytes, &PRIVATE_DER_PREFIX)
            .ok_or_else(|| {
                HederaError::InvalidPrivateKey(format!(
                    "expected a {ED25519_PRIVATE_KEY_LENGTH}-byte seed or a DER key, got {} bytes",
                    bytes.len()
                ))
            })?;
        let signing = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Ok(Self { signing })
    }

    /// Reads a key from hex, raw or DER, with or without `0x`.
    ///
    /// This is the format operator keys are usually handed out in.
    pub fn from_string(s: &str) -> HederaResult<Self> {
        let bytes = decode_hex(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the PKCS#8 DER encoding of this key.
    pub fn to_der(&self) -> Zeroizing<Vec<u8>> {
        let mut der = Vec::with_capacity(PRIVATE_DER_PREFIX.len() + ED25519_PRIVATE_KEY_LENGTH);
        der.extend_from_slice(&PRIVATE_DER_PREFIX);
        der.extend_from_slice(self.signing.as_bytes());
        Zeroizing::new(der)
    }

    /// Returns the DER encoding as a hex string, the form
    /// [`from_string`](Self::from_string) accepts back.
    pub fn to_string_der(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.to_der().as_slice()))
    }

    /// Returns the matching public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            verifying: self.signing.verifying_key(),
        }
    }

    /// Signs `message`.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing.sign(message))
    }
}

impl FromStr for Ed25519PrivateKey {
    type Err = HederaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TransactionSigner for Ed25519PrivateKey {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().to_bytes().to_vec()
    }

    fn sign_message(&self, message: &[u8]) -> HederaResult<Vec<u8>> {
        Ok(self.sign(message).to_bytes().to_vec())
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ed25519PrivateKey([REDACTED])")
    }
}

/// An Ed25519 public key.
///
/// `Display` prints the DER hex form used for account keys on Hedera.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    verifying: VerifyingKey,
}

impl Ed25519PublicKey {
    /// Reads a key from its 32 raw bytes or its 44-byte DER encoding.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        let raw = unwrap_der::<ED25519_PUBLIC_KEY_LENGTH>(bytes, &PUBLIC_DER_PREFIX).ok_or_else(
            || {
                HederaError::InvalidPublicKey(format!(
                    "expected {ED25519_PUBLIC_KEY_LENGTH} raw bytes or a DER key, got {} bytes",
                    bytes.len()
                ))
            },
        )?;
        let verifying = VerifyingKey::from_bytes(raw)
            .map_err(|e| HederaError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { verifying })
    }

    /// Reads a key from hex, raw or DER, with or without `0x`.
    pub fn from_string(s: &str) -> HederaResult<Self> {
        let bytes = decode_hex(s)?;
        Self::from_bytes(&bytes)
    }

    /// Raw key bytes, as carried in signature pairs.
    pub fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_LENGTH] {
        self.verifying.to_bytes()
    }

    /// DER `SubjectPublicKeyInfo` encoding.
    pub fn to_der(&self) -> Vec<u8> {
        let mut der = PUBLIC_DER_PREFIX.to_vec();
        der.extend_from_slice(self.verifying.as_bytes());
        der
    }

    /// Raw key bytes as `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.verifying.as_bytes()))
    }

    /// Checks `signature` over `message`.
    ///
    /// # Errors
    ///
    /// [`HederaError::SignatureVerificationFailed`] if it does not verify.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> HederaResult<()> {
        self.verifying
            .verify(message, &signature.0)
            .map_err(|_| HederaError::SignatureVerificationFailed)
    }
}

impl FromStr for Ed25519PublicKey {
    type Err = HederaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_der()))
    }
}

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(ed25519_dalek::Signature);

impl Ed25519Signature {
    /// Reads a signature from its 64 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> HederaResult<Self> {
        ed25519_dalek::Signature::from_slice(bytes)
            .map(Self)
            .map_err(|_| {
                HederaError::Signing(format!(
                    "expected {ED25519_SIGNATURE_LENGTH} signature bytes, got {}",
                    bytes.len()
                ))
            })
    }

    /// Raw signature bytes.
    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_LENGTH] {
        self.0.to_bytes()
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature(0x{})", hex::encode(self.to_bytes()))
    }
}
