//! Solana transaction containers
//!
//! Wire decoding is `bincode` over the `solana-sdk` transaction types. On top
//! of it sit the checks the signer relies on: the versioned container carries
//! exactly one slot per required signer, the legacy container may carry fewer
//! (missing slots are padded with empty signatures), and the message header
//! must fit its account keys. Trailing bytes are rejected by both.
//!
//! [`parse_transaction`] sniffs the container format: the versioned
//! container is always tried first, the legacy container second, and the
//! caller gets a tagged [`ParsedTransaction`] rather than an error chain.

use bincode::Options;
use serde::Serialize;
use solana_sdk::message::{MessageHeader, MESSAGE_VERSION_PREFIX};
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use thiserror::Error;

/// Structural failure while reading a transaction
#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed transaction: {0}")]
    Malformed(#[from] bincode::Error),

    #[error("versioned message inside a legacy transaction container")]
    VersionedMessage,

    #[error("expected {expected} signatures, found {found}")]
    SignatureCount { expected: usize, found: usize },

    #[error("invalid message header: {0}")]
    InvalidHeader(String),
}

/// Outcome of sniffing a serialized transaction
#[derive(Debug)]
pub enum ParsedTransaction {
    Versioned(VersionedTransaction),
    Legacy(Transaction),
    Unrecognized {
        versioned: WireError,
        legacy: WireError,
    },
}

/// Interpret `bytes` as a versioned container, else as a legacy one
pub fn parse_transaction(bytes: &[u8]) -> ParsedTransaction {
    let versioned = match deserialize_versioned(bytes) {
        Ok(tx) => return ParsedTransaction::Versioned(tx),
        Err(e) => e,
    };

    match deserialize_legacy(bytes) {
        Ok(tx) => ParsedTransaction::Legacy(tx),
        Err(legacy) => ParsedTransaction::Unrecognized { versioned, legacy },
    }
}

/// Versioned container: legacy or v0 message, one slot per required signer
pub fn deserialize_versioned(bytes: &[u8]) -> Result<VersionedTransaction, WireError> {
    let tx: VersionedTransaction = wire_options().deserialize(bytes)?;
    check_header(tx.message.header(), tx.message.static_account_keys().len())?;

    let expected = required_signatures(tx.message.header());
    if tx.signatures.len() != expected {
        return Err(WireError::SignatureCount {
            expected,
            found: tx.signatures.len(),
        });
    }

    Ok(tx)
}

/// Legacy container: signatures may be partially present, and the returned
/// transaction has every required slot, empty ones set to the default signature
pub fn deserialize_legacy(bytes: &[u8]) -> Result<Transaction, WireError> {
    let mut tx: Transaction = wire_options().deserialize(bytes)?;

    if tx.message.header.num_required_signatures & MESSAGE_VERSION_PREFIX != 0 {
        return Err(WireError::VersionedMessage);
    }
    check_header(&tx.message.header, tx.message.account_keys.len())?;

    let expected = required_signatures(&tx.message.header);
    if tx.signatures.len() > expected {
        return Err(WireError::SignatureCount {
            expected,
            found: tx.signatures.len(),
        });
    }
    tx.signatures.resize(expected, Signature::default());

    Ok(tx)
}

/// Wire bytes of either container
pub fn serialize_transaction<T: Serialize>(tx: &T) -> Result<Vec<u8>, WireError> {
    Ok(bincode::serialize(tx)?)
}

/// Slot index of `pubkey` among the required signers
pub fn signer_index(
    account_keys: &[Pubkey],
    header: &MessageHeader,
    pubkey: &Pubkey,
) -> Option<usize> {
    account_keys
        .iter()
        .take(required_signatures(header))
        .position(|key| key == pubkey)
}

/// First signature slot, unless it is still empty
pub fn first_signature(signatures: &[Signature]) -> Option<Signature> {
    signatures
        .first()
        .copied()
        .filter(|signature| *signature != Signature::default())
}

fn required_signatures(header: &MessageHeader) -> usize {
    usize::from(header.num_required_signatures)
}

// Fixed-width integers as on the wire; a transaction never exceeds one packet
fn wire_options() -> impl Options {
    bincode::options()
        .with_limit(PACKET_DATA_SIZE as u64)
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

fn check_header(header: &MessageHeader, key_count: usize) -> Result<(), WireError> {
    let required = required_signatures(header);
    let readonly_signed = usize::from(header.num_readonly_signed_accounts);
    let readonly_unsigned = usize::from(header.num_readonly_unsigned_accounts);

    if required > key_count {
        return Err(WireError::InvalidHeader(format!(
            "{} required signatures but only {} account keys",
            required, key_count
        )));
    }
    if readonly_signed > required {
        return Err(WireError::InvalidHeader(
            "more readonly signed accounts than signers".to_string(),
        ));
    }
    if readonly_unsigned > key_count - required {
        return Err(WireError::InvalidHeader(
            "more readonly unsigned accounts than unsigned keys".to_string(),
        ));
    }
    Ok(())
}
