//! Solana cryptographic utilities
//!
//! Provides:
//! - Ed25519 key handles from seeds or 64-byte keypair secrets
//! - Message signing
//! - Public key encoding and signature verification

use crate::errors::{QuoteSignError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use zeroize::Zeroizing;

/// Solana key pair (Ed25519)
pub struct SolKeyPair {
    signing_key: SigningKey,
}

impl SolKeyPair {
    /// Create from raw private key bytes (32 bytes seed)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let seed: &[u8; 32] = bytes.try_into().map_err(|_| {
            QuoteSignError::InvalidKeyFormat(format!(
                "Expected 32 bytes seed, got {}",
                bytes.len()
            ))
        })?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(seed),
        })
    }

    /// Create from full 64-byte keypair (`seed || pubkey`, as written by Solana tooling)
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(QuoteSignError::InvalidKeyFormat(format!(
                "Expected 64 bytes keypair, got {}",
                bytes.len()
            )));
        }

        let keypair = Self::from_bytes(&bytes[..32])?;
        if keypair.public_key() != bytes[32..] {
            return Err(QuoteSignError::InvalidKeyFormat(
                "Public key half does not match the secret seed".to_string(),
            ));
        }

        Ok(keypair)
    }

    /// Get the public key (32 bytes)
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.public_key())
    }

    /// Get the public key as base58 string (Solana address format)
    pub fn public_key_base58(&self) -> String {
        bs58::encode(self.public_key()).into_string()
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> SolSignature {
        SolSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// The same key as a `solana-sdk` keypair, for the SDK's transaction signing
    pub fn to_sdk_keypair(&self) -> Result<Keypair> {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        Keypair::from_bytes(bytes.as_slice())
            .map_err(|e| QuoteSignError::InvalidKeyFormat(e.to_string()))
    }
}

impl std::fmt::Debug for SolKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolKeyPair")
            .field("public_key", &self.public_key_base58())
            .finish_non_exhaustive()
    }
}

/// Solana signature (64 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolSignature {
    pub bytes: [u8; 64],
}

/// Verify a signature
pub fn verify_signature(pubkey: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> Result<bool> {
    let verifying_key = VerifyingKey::from_bytes(pubkey)
        .map_err(|e| QuoteSignError::InvalidKeyFormat(e.to_string()))?;

    let sig = Signature::from_bytes(signature);

    Ok(verifying_key.verify_strict(message, &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing() {
        let keypair = SolKeyPair::from_bytes(&[2u8; 32]).unwrap();
        let message = b"Hello, Solana!";

        let sig = keypair.sign(message);
        assert!(verify_signature(&keypair.public_key(), message, &sig.bytes).unwrap());
        assert!(!verify_signature(&keypair.public_key(), b"Wrong message", &sig.bytes).unwrap());
    }

    #[test]
    fn test_from_keypair_bytes() {
        let keypair = SolKeyPair::from_bytes(&[3u8; 32]).unwrap();

        let mut secret = vec![3u8; 32];
        secret.extend_from_slice(&keypair.public_key());

        let restored = SolKeyPair::from_keypair_bytes(&secret).unwrap();
        assert_eq!(restored.public_key(), keypair.public_key());
    }

    #[test]
    fn test_from_keypair_bytes_rejects_mismatched_pubkey() {
        let mut secret = vec![3u8; 32];
        secret.extend_from_slice(&[0u8; 32]);

        assert!(matches!(
            SolKeyPair::from_keypair_bytes(&secret),
            Err(QuoteSignError::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            SolKeyPair::from_keypair_bytes(&[3u8; 32]),
            Err(QuoteSignError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_sdk_keypair_matches() {
        use solana_sdk::signer::Signer as _;

        let keypair = SolKeyPair::from_bytes(&[5u8; 32]).unwrap();
        let sdk = keypair.to_sdk_keypair().unwrap();
        assert_eq!(sdk.pubkey(), keypair.pubkey());

        // Ed25519 is deterministic, so both produce the same signature
        let message = b"same key, same signature";
        assert_eq!(sdk.sign_message(message).as_ref(), &keypair.sign(message).bytes[..]);
    }

    #[test]
    fn test_pubkey_base58_round_trip() {
        let keypair = SolKeyPair::from_bytes(&[4u8; 32]).unwrap();
        let decoded = bs58::decode(keypair.public_key_base58()).into_vec().unwrap();
        assert_eq!(decoded, keypair.public_key());
    }
}
