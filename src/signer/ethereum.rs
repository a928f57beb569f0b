//! EVM type-2 (EIP-1559) signer
//!
//! Takes the unsigned payload a quote carries, `0x02 || rlp([chainId, nonce,
//! maxPriorityFeePerGas, maxFeePerGas, gasLimit, to, value, data,
//! accessList])`, signs `keccak256` of the whole payload (type byte
//! included) and returns `0x02 || rlp([...9 fields, yParity, r, s])`.

use crate::codec::rlp::{trim_leading_zeros, RlpItem};
use crate::crypto::{keccak256, EthKeyPair, EthSignature};
use crate::errors::{QuoteSignError, Result};
use secrecy::SecretString;
use tracing::debug;

/// Leading type byte of an EIP-1559 transaction
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// Fields in the unsigned body
pub const UNSIGNED_FIELD_COUNT: usize = 9;

/// Fields in the signed body (unsigned fields, then yParity, r, s)
pub const SIGNED_FIELD_COUNT: usize = UNSIGNED_FIELD_COUNT + 3;

/// Signed EIP-1559 transaction
#[derive(Debug, Clone)]
pub struct SignedEip1559Transaction {
    raw: Vec<u8>,
    signature: EthSignature,
}

impl SignedEip1559Transaction {
    /// Broadcast-ready bytes: `0x02 || rlp(12 fields)`
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// yParity, r and s as produced by the signer
    pub fn signature(&self) -> &EthSignature {
        &self.signature
    }

    pub fn tx_hash(&self) -> [u8; 32] {
        keccak256(&self.raw)
    }

    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash()))
    }

    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

/// Signing digest of an unsigned type-2 payload: keccak256 over the type
/// byte and the RLP body together
pub fn signing_digest(unsigned_tx: &[u8]) -> Result<[u8; 32]> {
    split_type2(unsigned_tx)?;
    Ok(keccak256(unsigned_tx))
}

/// Sign an unsigned type-2 payload
pub fn sign_type2(unsigned_tx: &[u8], keypair: &EthKeyPair) -> Result<SignedEip1559Transaction> {
    let body = split_type2(unsigned_tx)?;
    let mut fields = decode_unsigned_fields(body)?;

    let digest = keccak256(unsigned_tx);
    let signature = keypair.sign_hash(&digest)?;

    if signature.recover(&digest)? != *keypair.verifying_key() {
        return Err(QuoteSignError::SigningFailed(
            "Signature does not recover to the signing key".to_string(),
        ));
    }

    fields.extend(signature_fields(&signature)?);
    debug_assert_eq!(fields.len(), SIGNED_FIELD_COUNT);

    let encoded = RlpItem::List(fields).encode();
    let mut raw = Vec::with_capacity(1 + encoded.len());
    raw.push(EIP1559_TX_TYPE);
    raw.extend_from_slice(&encoded);

    debug!(
        "Signed EIP-1559 tx: from={}, y_parity={}, bytes={}",
        keypair.address_checksum(),
        signature.y_parity,
        raw.len()
    );

    Ok(SignedEip1559Transaction { raw, signature })
}

/// Sign a hex payload (`0x` optional) with a hex private key, returning
/// `0x`-prefixed hex
pub fn sign_type2_hex(unsigned_hex: &str, private_key: &SecretString) -> Result<String> {
    let unsigned = decode_hex_payload(unsigned_hex)?;
    let keypair = EthKeyPair::from_hex(private_key)?;
    Ok(sign_type2(&unsigned, &keypair)?.raw_tx_hex())
}

/// Decode a `0x`-prefixed (or bare) hex payload
pub fn decode_hex_payload(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    let digits = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(digits).map_err(|e| QuoteSignError::decode("hex", e.to_string()))
}

/// Decode the nine unsigned fields of a type-2 body
pub fn decode_unsigned_fields(body: &[u8]) -> Result<Vec<RlpItem>> {
    let fields = match RlpItem::decode_strict(body)? {
        RlpItem::List(fields) => fields,
        RlpItem::Bytes(_) => {
            return Err(QuoteSignError::decode(
                "rlp",
                "type-2 body is a byte string, expected a list",
            ))
        }
    };

    if fields.len() != UNSIGNED_FIELD_COUNT {
        return Err(QuoteSignError::decode(
            "rlp",
            format!(
                "expected {} unsigned EIP-1559 fields, found {}",
                UNSIGNED_FIELD_COUNT,
                fields.len()
            ),
        ));
    }

    debug!(
        "Decoded EIP-1559 body: chain_id={:?}, nonce={:?}",
        fields[0].as_u64(),
        fields[1].as_u64()
    );
    Ok(fields)
}

/// Canonical `[yParity, r, s]`: yParity is empty for 0 and `0x01` for 1,
/// r and s carry no leading zero bytes
pub fn signature_fields(signature: &EthSignature) -> Result<[RlpItem; 3]> {
    let y_parity = match signature.y_parity {
        0 => RlpItem::Bytes(Vec::new()),
        1 => RlpItem::Bytes(vec![0x01]),
        other => {
            return Err(QuoteSignError::SigningFailed(format!(
                "yParity must be 0 or 1, got {}",
                other
            )))
        }
    };

    Ok([
        y_parity,
        RlpItem::Bytes(trim_leading_zeros(&signature.r).to_vec()),
        RlpItem::Bytes(trim_leading_zeros(&signature.s).to_vec()),
    ])
}

fn split_type2(unsigned_tx: &[u8]) -> Result<&[u8]> {
    match unsigned_tx.split_first() {
        Some((&EIP1559_TX_TYPE, body)) => Ok(body),
        _ => Err(QuoteSignError::FormatError(
            "not an EIP-1559 type-2 payload (expected 0x02 prefix)".to_string(),
        )),
    }
}
