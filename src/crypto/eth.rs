//! Ethereum cryptographic utilities
//!
//! Provides:
//! - secp256k1 key handles built from raw or hex private keys
//! - Recoverable prehash signing and public key recovery
//! - Address derivation (EIP-55 checksums)

use crate::errors::{QuoteSignError, Result};
use crate::security::SecureBytes;
use k256::{
    ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey},
    SecretKey,
};
use secrecy::{ExposeSecret, SecretString};
use sha3::{Digest, Keccak256};

/// Ethereum key pair
///
/// The inner `SigningKey` zeroizes its scalar on drop.
pub struct EthKeyPair {
    signing_key: SigningKey,
}

impl EthKeyPair {
    /// Create from raw private key bytes (32 bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(QuoteSignError::InvalidKeyFormat(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| QuoteSignError::InvalidKeyFormat(e.to_string()))?;

        let signing_key = SigningKey::from(secret_key);
        Ok(Self { signing_key })
    }

    /// Create from a hex private key (`0x` prefix optional)
    pub fn from_hex(private_key: &SecretString) -> Result<Self> {
        let bytes = SecureBytes::from_hex(private_key.expose_secret())
            .map_err(|e| QuoteSignError::InvalidKeyFormat(format!("Hex decode error: {}", e)))?;
        Self::from_bytes(bytes.expose())
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Get the Ethereum address (20 bytes)
    pub fn address(&self) -> [u8; 20] {
        address_of(self.verifying_key())
    }

    /// Get the checksummed Ethereum address string
    pub fn address_checksum(&self) -> String {
        checksum_address(&self.address())
    }

    /// Sign a 32-byte digest with deterministic (RFC 6979) ECDSA
    ///
    /// `s` is normalized to the lower half of the curve order and the
    /// recovery id adjusted to match.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<EthSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| QuoteSignError::SigningFailed(e.to_string()))?;

        if recovery_id.is_x_reduced() {
            return Err(QuoteSignError::SigningFailed(
                "Recovery id with reduced x-coordinate cannot be expressed as yParity".to_string(),
            ));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature.r().to_bytes());
        s.copy_from_slice(&signature.s().to_bytes());

        Ok(EthSignature {
            r,
            s,
            y_parity: u8::from(recovery_id.is_y_odd()),
        })
    }
}

impl std::fmt::Debug for EthKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthKeyPair")
            .field("address", &self.address_checksum())
            .finish_non_exhaustive()
    }
}

/// Ethereum signature with its y-parity bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub y_parity: u8,
}

impl EthSignature {
    /// Recover the verifying key that produced this signature over `hash`
    pub fn recover(&self, hash: &[u8; 32]) -> Result<VerifyingKey> {
        let signature = Signature::from_scalars(self.r, self.s)
            .map_err(|e| QuoteSignError::SigningFailed(format!("Invalid signature scalars: {}", e)))?;
        let recovery_id = RecoveryId::from_byte(self.y_parity).ok_or_else(|| {
            QuoteSignError::SigningFailed(format!("Invalid yParity {}", self.y_parity))
        })?;

        VerifyingKey::recover_from_prehash(hash, &signature, recovery_id)
            .map_err(|e| QuoteSignError::SigningFailed(format!("Recovery failed: {}", e)))
    }

    /// Recover the signer's address
    pub fn recover_address(&self, hash: &[u8; 32]) -> Result<[u8; 20]> {
        Ok(address_of(&self.recover(hash)?))
    }
}

/// Compute keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn address_of(verifying_key: &VerifyingKey) -> [u8; 20] {
    let pubkey = verifying_key.to_encoded_point(false);
    // Skip the 0x04 prefix and hash the remaining 64 bytes
    let hash = keccak256(&pubkey.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Convert an address to checksummed format (EIP-55)
pub fn checksum_address(address: &[u8; 20]) -> String {
    let addr_hex = hex::encode(address);
    let hash = keccak256(addr_hex.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (i, c) in addr_hex.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}
