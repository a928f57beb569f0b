//! Recursive Length Prefix values
//!
//! [`RlpItem`] is a closed union of byte strings and lists. Decoding is
//! strict: input is only accepted when re-encoding the decoded value
//! reproduces it byte for byte, so a decoded transaction body can be
//! extended and re-encoded without disturbing the fields it already had.

use crate::errors::{QuoteSignError, Result};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Deepest list nesting accepted when decoding. A type-2 body needs four
/// levels (body, access list, entry, storage keys).
pub const MAX_DEPTH: usize = 16;

/// A decoded RLP value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Byte string holding the minimal big-endian encoding of an integer
    pub fn uint(be_bytes: &[u8]) -> Self {
        RlpItem::Bytes(trim_leading_zeros(be_bytes).to_vec())
    }

    /// Decode exactly one canonical item spanning all of `bytes`
    pub fn decode_strict(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(QuoteSignError::decode("rlp", "empty input"));
        }

        let item: RlpItem = rlp::decode(bytes)?;
        if item.encode() != bytes {
            return Err(QuoteSignError::decode(
                "rlp",
                "input is not canonically encoded or has trailing bytes",
            ));
        }

        Ok(item)
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(bytes) => Some(bytes),
            RlpItem::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::Bytes(_) => None,
            RlpItem::List(items) => Some(items),
        }
    }

    /// Interpret a byte string as a big-endian integer that fits in a u64
    pub fn as_u64(&self) -> Option<u64> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 8 {
            return None;
        }
        Some(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }
}

impl Encodable for RlpItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            RlpItem::Bytes(bytes) => {
                s.append(bytes);
            }
            RlpItem::List(items) => {
                s.begin_list(items.len());
                for item in items {
                    s.append(item);
                }
            }
        }
    }
}

impl Decodable for RlpItem {
    fn decode(rlp: &Rlp) -> std::result::Result<Self, DecoderError> {
        decode_nested(rlp, 1)
    }
}

fn decode_nested(rlp: &Rlp, depth: usize) -> std::result::Result<RlpItem, DecoderError> {
    if !rlp.is_list() {
        return Ok(RlpItem::Bytes(rlp.data()?.to_vec()));
    }
    if depth > MAX_DEPTH {
        return Err(DecoderError::Custom("list nesting too deep"));
    }

    let count = rlp.item_count()?;
    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        items.push(decode_nested(&rlp.at(index)?, depth + 1)?);
    }
    Ok(RlpItem::List(items))
}

/// Strip leading zero bytes; zero becomes the empty string
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// `depth` empty lists, each wrapped in the next
#[cfg(test)]
pub(crate) fn nested_lists(depth: usize) -> Vec<u8> {
    let mut headers = Vec::with_capacity(depth);
    let mut len: usize = 1;
    for _ in 1..depth {
        let header = if len < 56 {
            vec![0xc0 + len as u8]
        } else {
            let len_bytes = trim_leading_zeros(&len.to_be_bytes()).to_vec();
            let mut header = vec![0xf7 + len_bytes.len() as u8];
            header.extend_from_slice(&len_bytes);
            header
        };
        len += header.len();
        headers.push(header);
    }

    let mut encoded: Vec<u8> = headers.into_iter().rev().flatten().collect();
    encoded.push(0xc0);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(b: &[u8]) -> RlpItem {
        RlpItem::Bytes(b.to_vec())
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(bytes(b"dog").encode(), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(bytes(&[]).encode(), vec![0x80]);
        assert_eq!(bytes(&[0x0f]).encode(), vec![0x0f]);
        assert_eq!(RlpItem::List(vec![]).encode(), vec![0xc0]);
        assert_eq!(
            RlpItem::List(vec![bytes(b"cat"), bytes(b"dog")]).encode(),
            hex::decode("c88363617483646f67").unwrap()
        );
    }

    #[test]
    fn test_long_string_prefix() {
        let long = vec![0xaa; 56];
        let encoded = bytes(&long).encode();
        assert_eq!(&encoded[..2], &[0xb8, 56]);
        assert_eq!(RlpItem::decode_strict(&encoded).unwrap(), bytes(&long));
    }

    #[test]
    fn test_nested_lists_decode() {
        // [ [], [[]], [ [], [[]] ] ]
        let encoded = hex::decode("c7c0c1c0c3c0c1c0").unwrap();
        let item = RlpItem::decode_strict(&encoded).unwrap();

        let empty = RlpItem::List(vec![]);
        let expected = RlpItem::List(vec![
            empty.clone(),
            RlpItem::List(vec![empty.clone()]),
            RlpItem::List(vec![empty.clone(), RlpItem::List(vec![empty])]),
        ]);
        assert_eq!(item, expected);
        assert_eq!(item.encode(), encoded);
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let deepest = RlpItem::decode_strict(&nested_lists(MAX_DEPTH)).unwrap();
        assert_eq!(deepest.encode(), nested_lists(MAX_DEPTH));

        for depth in [MAX_DEPTH + 1, 200_000] {
            assert!(matches!(
                RlpItem::decode_strict(&nested_lists(depth)),
                Err(QuoteSignError::DecodeError { stage: "rlp", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut encoded = RlpItem::List(vec![bytes(b"cat")]).encode();
        encoded.push(0x00);
        assert!(matches!(
            RlpItem::decode_strict(&encoded),
            Err(QuoteSignError::DecodeError { stage: "rlp", .. })
        ));
    }

    #[test]
    fn test_rejects_non_canonical_single_byte() {
        // 0x05 must be encoded as itself, not as 0x81 0x05
        assert!(RlpItem::decode_strict(&[0x81, 0x05]).is_err());
    }

    #[test]
    fn test_rejects_truncated_and_empty() {
        assert!(RlpItem::decode_strict(&[]).is_err());
        assert!(RlpItem::decode_strict(&[0x83, b'd', b'o']).is_err());
        assert!(RlpItem::decode_strict(&[0xc3, 0x80]).is_err());
    }

    #[test]
    fn test_uint_is_minimal() {
        assert_eq!(RlpItem::uint(&[0, 0, 1, 0]), bytes(&[1, 0]));
        assert_eq!(RlpItem::uint(&[0, 0]), bytes(&[]));
        assert_eq!(RlpItem::uint(&[]).encode(), vec![0x80]);
    }

    #[test]
    fn test_as_u64() {
        assert_eq!(bytes(&[0xaa, 0x36, 0xa7]).as_u64(), Some(11_155_111));
        assert_eq!(bytes(&[]).as_u64(), Some(0));
        assert_eq!(bytes(&[1; 9]).as_u64(), None);
        assert_eq!(RlpItem::List(vec![]).as_u64(), None);
    }
}
