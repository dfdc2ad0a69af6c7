//! # RLP Codec
//!
//! Recursive-length-prefix encoding: the canonical binary serialization
//! for nested byte strings and lists used throughout the trie.
//!
//! The decoder is strict. Every accepted input has exactly one canonical
//! encoding, so `encode(decode(bytes)) == bytes` and no two distinct byte
//! strings decode to the same structure. Non-minimal length prefixes,
//! truncated payloads and trailing bytes are all rejected.

use crate::error::{ProofError, Result};

/// An RLP item: either a byte string or an ordered list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Byte string item from anything byte-like
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpItem::Bytes(data.into())
    }

    /// Get the payload if this is a byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(b) => Some(b),
            RlpItem::List(_) => None,
        }
    }

    /// Get the elements if this is a list
    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::Bytes(_) => None,
            RlpItem::List(items) => Some(items),
        }
    }
}

/// Encode an item to its canonical RLP byte string.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    match item {
        RlpItem::Bytes(data) => encode_bytes(data),
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for item in items {
                payload.extend_from_slice(&encode(item));
            }
            wrap_list(payload)
        }
    }
}

/// Encode a byte string: a single byte < 0x80 as itself, short strings
/// with a `0x80 + len` prefix, longer ones with a big-endian length.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        data.to_vec()
    } else if data.len() < 56 {
        let mut out = Vec::with_capacity(1 + data.len());
        out.push(0x80 + data.len() as u8);
        out.extend_from_slice(data);
        out
    } else {
        let mut out = length_prefix(0xb7, data.len());
        out.extend_from_slice(data);
        out
    }
}

/// Wrap an already-encoded concatenation of items in a list header.
pub fn wrap_list(payload: Vec<u8>) -> Vec<u8> {
    if payload.len() < 56 {
        let mut out = Vec::with_capacity(1 + payload.len());
        out.push(0xc0 + payload.len() as u8);
        out.extend_from_slice(&payload);
        out
    } else {
        let mut out = length_prefix(0xf7, payload.len());
        out.extend_from_slice(&payload);
        out
    }
}

fn length_prefix(offset: u8, len: usize) -> Vec<u8> {
    let be = len.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    let mut out = Vec::with_capacity(1 + be.len() - skip);
    out.push(offset + (be.len() - skip) as u8);
    out.extend_from_slice(&be[skip..]);
    out
}

/// Trie key for a transaction index: the RLP encoding of the minimal
/// big-endian integer. Index 0 has an empty payload and encodes as `0x80`.
pub fn encode_index(index: u64) -> Vec<u8> {
    let be = index.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    encode_bytes(&be[skip..])
}

/// Decode exactly one item from the input. Fails on any non-canonical
/// form, on truncated payloads, and on bytes trailing the item.
pub fn decode(data: &[u8]) -> Result<RlpItem> {
    let (item, consumed) = decode_at(data)?;
    if consumed != data.len() {
        return Err(ProofError::MalformedEncoding("trailing bytes after item"));
    }
    Ok(item)
}

/// Decode one item from the front of the input, returning the bytes used.
fn decode_at(data: &[u8]) -> Result<(RlpItem, usize)> {
    let first = *data
        .first()
        .ok_or(ProofError::MalformedEncoding("empty input"))?;

    match first {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![first]), 1)),
        0x80..=0xb7 => {
            let len = (first - 0x80) as usize;
            let payload = take(data, 1, len)?;
            if len == 1 && payload[0] < 0x80 {
                return Err(ProofError::MalformedEncoding(
                    "single byte below 0x80 must encode as itself",
                ));
            }
            Ok((RlpItem::Bytes(payload.to_vec()), 1 + len))
        }
        0xb8..=0xbf => {
            let (len, header) = long_length(data, 0xb7)?;
            let payload = take(data, header, len)?;
            Ok((RlpItem::Bytes(payload.to_vec()), header + len))
        }
        0xc0..=0xf7 => {
            let len = (first - 0xc0) as usize;
            let payload = take(data, 1, len)?;
            Ok((RlpItem::List(decode_elements(payload)?), 1 + len))
        }
        0xf8..=0xff => {
            let (len, header) = long_length(data, 0xf7)?;
            let payload = take(data, header, len)?;
            Ok((RlpItem::List(decode_elements(payload)?), header + len))
        }
    }
}

/// Parse a long-form length prefix. Returns (payload length, header size).
fn long_length(data: &[u8], offset: u8) -> Result<(usize, usize)> {
    let len_of_len = (data[0] - offset) as usize;
    let len_bytes = take(data, 1, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(ProofError::MalformedEncoding("leading zero in length"));
    }
    let mut len = 0usize;
    for byte in len_bytes {
        len = len
            .checked_mul(256)
            .ok_or(ProofError::MalformedEncoding("length overflow"))?
            + *byte as usize;
    }
    if len < 56 {
        return Err(ProofError::MalformedEncoding(
            "long form used for short payload",
        ));
    }
    Ok((len, 1 + len_of_len))
}

fn take(data: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    let end = start
        .checked_add(len)
        .ok_or(ProofError::MalformedEncoding("length overflow"))?;
    data.get(start..end)
        .ok_or(ProofError::MalformedEncoding("payload exceeds input"))
}

/// Decode back-to-back items filling a list payload exactly.
fn decode_elements(payload: &[u8]) -> Result<Vec<RlpItem>> {
    let mut items = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let (item, used) = decode_at(&payload[pos..])?;
        items.push(item);
        pos += used;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(encode(&RlpItem::bytes("dog")), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(encode(&RlpItem::bytes("")), vec![0x80]);
        assert_eq!(encode(&RlpItem::List(vec![])), vec![0xc0]);
        assert_eq!(encode(&RlpItem::bytes([0x0f])), vec![0x0f]);
        assert_eq!(encode(&RlpItem::bytes([0x80])), vec![0x81, 0x80]);

        let cat_dog = RlpItem::List(vec![RlpItem::bytes("cat"), RlpItem::bytes("dog")]);
        assert_eq!(
            encode(&cat_dog),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
    }

    #[test]
    fn test_encode_long_string() {
        let data = vec![0xaa; 56];
        let encoded = encode(&RlpItem::Bytes(data.clone()));
        assert_eq!(encoded[0], 0xb8);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn test_roundtrip_nested() {
        let item = RlpItem::List(vec![
            RlpItem::bytes("cat"),
            RlpItem::List(vec![RlpItem::bytes(""), RlpItem::bytes([1, 2, 3])]),
            RlpItem::Bytes(vec![0x55; 60]),
        ]);
        let encoded = encode(&item);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn test_roundtrip_long_list() {
        let items: Vec<RlpItem> = (0..20).map(|i| RlpItem::bytes([i as u8; 4])).collect();
        let item = RlpItem::List(items);
        let encoded = encode(&item);
        assert_eq!(encoded[0], 0xf8);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn test_reject_wrapped_single_byte() {
        // 0x05 must encode as itself, not as 0x81 0x05
        assert!(decode(&[0x81, 0x05]).is_err());
        assert!(decode(&[0x81, 0x7f]).is_err());
        // 0x80 and above genuinely need the prefix
        assert!(decode(&[0x81, 0x80]).is_ok());
    }

    #[test]
    fn test_reject_non_minimal_long_form() {
        // 5-byte payload forced into long form
        let mut bad = vec![0xb8, 0x05];
        bad.extend_from_slice(&[1, 2, 3, 4, 5]);
        assert!(decode(&bad).is_err());
    }

    #[test]
    fn test_reject_leading_zero_length() {
        let mut bad = vec![0xb9, 0x00, 0x38];
        bad.extend_from_slice(&[0xaa; 56]);
        assert!(decode(&bad).is_err());
    }

    #[test]
    fn test_reject_truncated() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x83, b'd', b'o']).is_err());
        assert!(decode(&[0xb8, 0x38]).is_err());
        assert!(decode(&[0xc8, 0x83, b'c']).is_err());
    }

    #[test]
    fn test_reject_trailing_bytes() {
        assert!(decode(&[0x80, 0x00]).is_err());
        assert!(decode(&[0xc0, 0xc0]).is_err());
    }

    #[test]
    fn test_reject_bad_nested_element() {
        // list payload holding a non-canonical element
        assert!(decode(&[0xc2, 0x81, 0x05]).is_err());
    }

    #[test]
    fn test_encode_index() {
        assert_eq!(encode_index(0), vec![0x80]);
        assert_eq!(encode_index(1), vec![0x01]);
        assert_eq!(encode_index(127), vec![0x7f]);
        assert_eq!(encode_index(128), vec![0x81, 0x80]);
        assert_eq!(encode_index(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_index(1024), vec![0x82, 0x04, 0x00]);
    }

    #[test]
    fn test_index_keys_are_unique() {
        let keys: Vec<Vec<u8>> = (0..300).map(encode_index).collect();
        for (i, key) in keys.iter().enumerate() {
            for other in &keys[i + 1..] {
                assert_ne!(key, other);
            }
        }
    }
}
