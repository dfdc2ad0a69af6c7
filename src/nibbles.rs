//! # Nibbles
//!
//! Trie keys are sequences of nibbles (4-bit values), giving 16-way
//! branching at each node. The hex-prefix codec packs a nibble sequence
//! back into bytes together with a leaf flag and an odd-length marker.

use std::fmt;

use crate::error::{ProofError, Result};

/// A sequence of nibbles (4-bit values)
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Nibbles {
    data: Vec<u8>,
}

impl Nibbles {
    /// Create empty nibbles
    pub fn new() -> Self {
        Nibbles { data: Vec::new() }
    }

    /// Create from bytes (each byte becomes 2 nibbles, high first)
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            data.push(byte >> 4);
            data.push(byte & 0x0f);
        }
        Nibbles { data }
    }

    /// Create from raw nibble values
    pub fn from_nibbles(nibbles: Vec<u8>) -> Self {
        debug_assert!(nibbles.iter().all(|n| *n < 16));
        Nibbles { data: nibbles }
    }

    /// Encode to hex-prefix format. The first nibble of the output holds
    /// the 2-bit flag `(is_leaf << 1) | odd`; odd-length keys carry their
    /// first nibble in the low half of the flag byte, even-length keys a
    /// zero pad.
    pub fn encode_hex_prefix(&self, is_leaf: bool) -> Vec<u8> {
        let odd = self.data.len() % 2 == 1;
        let flag = ((is_leaf as u8) << 1) | (odd as u8);

        let mut encoded = Vec::with_capacity(1 + self.data.len() / 2);
        let rest = if odd {
            encoded.push(flag << 4 | self.data[0]);
            &self.data[1..]
        } else {
            encoded.push(flag << 4);
            &self.data[..]
        };
        for pair in rest.chunks(2) {
            encoded.push(pair[0] << 4 | pair[1]);
        }
        encoded
    }

    /// Decode hex-prefix format, returning the nibbles and the leaf flag.
    /// Rejects empty input, flag nibbles above 3, and a nonzero pad under
    /// an even-length flag.
    pub fn decode_hex_prefix(encoded: &[u8]) -> Result<(Self, bool)> {
        let first = *encoded.first().ok_or(ProofError::InvalidHexPrefix)?;
        let flag = first >> 4;
        if flag > 3 {
            return Err(ProofError::InvalidHexPrefix);
        }
        let is_leaf = flag & 2 != 0;
        let odd = flag & 1 != 0;
        if !odd && first & 0x0f != 0 {
            return Err(ProofError::InvalidHexPrefix);
        }

        let mut data = Vec::with_capacity(encoded.len() * 2);
        if odd {
            data.push(first & 0x0f);
        }
        for byte in &encoded[1..] {
            data.push(byte >> 4);
            data.push(byte & 0x0f);
        }
        Ok((Nibbles { data }, is_leaf))
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get nibble at index
    pub fn at(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    /// Split off the first nibble, returning it with the remainder
    pub fn split_first(&self) -> Option<(u8, Nibbles)> {
        let (first, rest) = self.data.split_first()?;
        Some((*first, Nibbles { data: rest.to_vec() }))
    }

    /// Get suffix starting at index
    pub fn slice(&self, start: usize) -> Self {
        Nibbles {
            data: self.data[start..].to_vec(),
        }
    }

    /// Get sub-range
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        Nibbles {
            data: self.data[start..end].to_vec(),
        }
    }

    /// Length of the common prefix with another sequence
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        self.data
            .iter()
            .zip(other.data.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Whether this sequence begins with `prefix`
    pub fn starts_with(&self, prefix: &Nibbles) -> bool {
        self.data.len() >= prefix.data.len() && self.data[..prefix.data.len()] == prefix.data[..]
    }

    /// Append another nibble sequence
    pub fn join(&mut self, other: &Nibbles) {
        self.data.extend_from_slice(&other.data);
    }

    /// Push a single nibble
    pub fn push(&mut self, nibble: u8) {
        debug_assert!(nibble < 16);
        self.data.push(nibble);
    }

    /// Get as slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Nibbles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nibbles(")?;
        for n in &self.data {
            write!(f, "{:x}", n)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Nibbles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in &self.data {
            write!(f, "{:x}", n)?;
        }
        Ok(())
    }
}
