//! Solana transaction signer
//!
//! Handles versioned and legacy transaction containers. The versioned
//! container is always tried first; the legacy container is only used when
//! the payload is not a structurally valid versioned transaction. In both
//! cases only the slot belonging to the supplied keypair is written, so a
//! multi-party transaction can collect its signatures across several calls.

use crate::codec::solana::{
    first_signature, parse_transaction, serialize_transaction, signer_index, ParsedTransaction,
};
use crate::crypto::SolKeyPair;
use crate::errors::{QuoteSignError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use solana_sdk::signature::Signature;
use solana_sdk::signer::SignerError;
use tracing::{debug, warn};

/// Container format a payload was signed as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFormat {
    Versioned,
    Legacy,
}

/// Result of signing a Solana transaction
#[derive(Debug, Clone)]
pub struct SignedSolanaTransaction {
    pub format: TransactionFormat,
    /// Slot filled by this call; `None` when the keypair is not a required signer
    pub signer_index: Option<usize>,
    pub bytes: Vec<u8>,
    first_signature: Option<Signature>,
}

impl SignedSolanaTransaction {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// The transaction id: base58 of the first signature, once that slot is filled
    pub fn transaction_id(&self) -> Option<String> {
        self.first_signature.map(|signature| signature.to_string())
    }
}

/// Sign a serialized transaction
pub fn sign_transaction(raw: &[u8], signer: &SolKeyPair) -> Result<SignedSolanaTransaction> {
    let pubkey = signer.pubkey();

    match parse_transaction(raw) {
        ParsedTransaction::Versioned(mut tx) => {
            let signer_index =
                signer_index(tx.message.static_account_keys(), tx.message.header(), &pubkey);
            match signer_index {
                Some(index) => {
                    let signature = signer.sign(&tx.message.serialize());
                    tx.signatures[index] = Signature::from(signature.bytes);
                    debug!(
                        "Signed versioned Solana tx: signer={}, slot={}/{}",
                        pubkey,
                        index,
                        tx.signatures.len()
                    );
                }
                None => warn_not_signer(signer),
            }

            Ok(SignedSolanaTransaction {
                format: TransactionFormat::Versioned,
                signer_index,
                bytes: encode(&tx)?,
                first_signature: first_signature(&tx.signatures),
            })
        }
        ParsedTransaction::Legacy(mut tx) => {
            let keypair = signer.to_sdk_keypair()?;
            let recent_blockhash = tx.message.recent_blockhash;

            let signer_index = match tx.try_partial_sign(&[&keypair], recent_blockhash) {
                Ok(()) => signer_index(&tx.message.account_keys, &tx.message.header, &pubkey),
                Err(SignerError::KeypairPubkeyMismatch) => {
                    warn_not_signer(signer);
                    None
                }
                Err(e) => return Err(QuoteSignError::SigningFailed(e.to_string())),
            };

            if let Some(index) = signer_index {
                debug!(
                    "Partially signed legacy Solana tx: signer={}, slot={}/{}, filled={}",
                    pubkey,
                    index,
                    tx.signatures.len(),
                    tx.signatures
                        .iter()
                        .filter(|s| **s != Signature::default())
                        .count()
                );
            }

            Ok(SignedSolanaTransaction {
                format: TransactionFormat::Legacy,
                signer_index,
                bytes: encode(&tx)?,
                first_signature: first_signature(&tx.signatures),
            })
        }
        ParsedTransaction::Unrecognized { versioned, legacy } => Err(QuoteSignError::decode(
            "solana",
            format!(
                "neither a valid versioned transaction ({}) nor a legacy transaction ({})",
                versioned, legacy
            ),
        )),
    }
}

/// Sign a base64 transaction, returning base64
pub fn sign_base64(unsigned_b64: &str, signer: &SolKeyPair) -> Result<String> {
    let raw = BASE64.decode(unsigned_b64.trim())?;
    Ok(sign_transaction(&raw, signer)?.to_base64())
}

fn encode<T: serde::Serialize>(tx: &T) -> Result<Vec<u8>> {
    serialize_transaction(tx)
        .map_err(|e| QuoteSignError::FormatError(format!("cannot serialize transaction: {}", e)))
}

fn warn_not_signer(signer: &SolKeyPair) {
    warn!(
        "Keypair {} is not a required signer; signature slots left unchanged",
        signer.public_key_base58()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::solana::fixtures::{legacy_message, v0_message};
    use crate::codec::solana::{deserialize_legacy, deserialize_versioned};
    use crate::crypto::verify_signature;
    use solana_sdk::message::VersionedMessage;
    use solana_sdk::transaction::{Transaction, VersionedTransaction};

    fn alice() -> SolKeyPair {
        SolKeyPair::from_bytes(&[0xa1; 32]).unwrap()
    }

    fn bob() -> SolKeyPair {
        SolKeyPair::from_bytes(&[0xb0; 32]).unwrap()
    }

    fn verifies(keypair: &SolKeyPair, message: &[u8], signature: &Signature) -> bool {
        let bytes: [u8; 64] = signature.as_ref().try_into().unwrap();
        verify_signature(&keypair.public_key(), message, &bytes).unwrap()
    }

    /// Legacy wire bytes with no signatures at all, as an unsigned quote
    /// payload for a multi-party transfer is typically produced
    fn unsigned_legacy_bytes() -> Vec<u8> {
        serialize_transaction(&Transaction {
            signatures: vec![],
            message: legacy_message([bob().pubkey(), alice().pubkey()]),
        })
        .unwrap()
    }

    #[test]
    fn test_legacy_fallback_fills_only_signer_slot() {
        let raw = unsigned_legacy_bytes();
        assert!(deserialize_versioned(&raw).is_err());

        let signed = sign_transaction(&raw, &alice()).unwrap();
        assert_eq!(signed.format, TransactionFormat::Legacy);
        assert_eq!(signed.signer_index, Some(1));

        let decoded = BASE64.decode(signed.to_base64()).unwrap();
        let tx = deserialize_legacy(&decoded).unwrap();
        assert_eq!(tx.signatures[0], Signature::default());
        assert!(verifies(&alice(), &tx.message_data(), &tx.signatures[1]));
        // slot 0 is still empty, so there is no transaction id yet
        assert_eq!(signed.transaction_id(), None);
    }

    #[test]
    fn test_legacy_signatures_accumulate_across_calls() {
        let first = sign_transaction(&unsigned_legacy_bytes(), &alice()).unwrap();
        // The output now carries a full signature array, so it parses as versioned
        let second = sign_transaction(&first.bytes, &bob()).unwrap();
        assert_eq!(second.format, TransactionFormat::Versioned);
        assert_eq!(second.signer_index, Some(0));

        let tx = deserialize_versioned(&second.bytes).unwrap();
        let message = tx.message.serialize();
        assert!(verifies(&bob(), &message, &tx.signatures[0]));
        assert!(verifies(&alice(), &message, &tx.signatures[1]));
        assert_eq!(second.transaction_id(), Some(tx.signatures[0].to_string()));
    }

    #[test]
    fn test_versioned_with_lookup_table_uses_primary_path() {
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: v0_message(alice().pubkey()),
        };
        let unsigned_b64 = BASE64.encode(serialize_transaction(&tx).unwrap());

        let signed_b64 = sign_base64(&unsigned_b64, &alice()).unwrap();
        let signed = deserialize_versioned(&BASE64.decode(signed_b64).unwrap()).unwrap();

        assert_eq!(signed.message, tx.message);
        match &signed.message {
            VersionedMessage::V0(message) => assert_eq!(message.address_table_lookups.len(), 1),
            other => panic!("expected a v0 message, got {:?}", other),
        }
        assert!(verifies(&alice(), &signed.message.serialize(), &signed.signatures[0]));
    }

    #[test]
    fn test_payload_valid_as_both_is_signed_as_versioned() {
        let raw = serialize_transaction(&Transaction {
            signatures: vec![Signature::default(); 2],
            message: legacy_message([alice().pubkey(), bob().pubkey()]),
        })
        .unwrap();

        let signed = sign_transaction(&raw, &alice()).unwrap();
        assert_eq!(signed.format, TransactionFormat::Versioned);
        assert_eq!(signed.signer_index, Some(0));
    }

    #[test]
    fn test_non_signer_leaves_slots_unchanged() {
        let raw = unsigned_legacy_bytes();
        let stranger = SolKeyPair::from_bytes(&[0x5e; 32]).unwrap();

        let signed = sign_transaction(&raw, &stranger).unwrap();
        assert_eq!(signed.format, TransactionFormat::Legacy);
        assert_eq!(signed.signer_index, None);

        let tx = deserialize_legacy(&signed.bytes).unwrap();
        assert!(tx.signatures.iter().all(|s| *s == Signature::default()));
        assert_eq!(signed.transaction_id(), None);
    }

    #[test]
    fn test_non_signer_versioned_output_unchanged() {
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: v0_message(alice().pubkey()),
        };
        let raw = serialize_transaction(&tx).unwrap();

        let signed = sign_transaction(&raw, &bob()).unwrap();
        assert_eq!(signed.signer_index, None);
        assert_eq!(signed.bytes, raw);
    }

    #[test]
    fn test_non_signing_account_is_not_a_signer() {
        let stranger = SolKeyPair::from_bytes(&[0x5e; 32]).unwrap();
        let mut message = legacy_message([bob().pubkey(), alice().pubkey()]);
        // writable account, but outside the required-signer prefix
        message.account_keys[2] = stranger.pubkey();

        let raw = serialize_transaction(&Transaction {
            signatures: vec![],
            message,
        })
        .unwrap();

        assert_eq!(sign_transaction(&raw, &stranger).unwrap().signer_index, None);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = sign_transaction(&[0x01, 0xff], &alice());
        match result {
            Err(QuoteSignError::DecodeError { stage, reason }) => {
                assert_eq!(stage, "solana");
                assert!(reason.contains("versioned"));
                assert!(reason.contains("legacy"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_base64_is_decode_error() {
        assert!(matches!(
            sign_base64("not base64!", &alice()),
            Err(QuoteSignError::DecodeError { stage: "base64", .. })
        ));
    }
}
