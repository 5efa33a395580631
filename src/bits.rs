//! Bitstream codec: lossless conversion between bytes and bit strings.
//!
//! Bits are stored one per element (`0` or `1`), most significant bit of each
//! byte first. A [`BitString`] prints as, and parses from, a string of `'0'`
//! and `'1'` characters.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when parsing a bit string containing anything but `0`/`1`.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid bit character {found:?} at position {position}")]
pub struct ParseBitsError {
    pub position: usize,
    pub found: char,
}

/// An ordered sequence of bits.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<u8>,
}

impl BitString {
    /// Creates an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bit string with room for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Appends one bit. Any non-zero value counts as `1`.
    pub fn push(&mut self, bit: u8) {
        self.bits.push((bit != 0) as u8);
    }

    /// Appends all bits of `other`.
    pub fn extend(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the bit at `index`, if any.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bits.get(index).copied()
    }

    /// Returns true if the last bits equal `suffix`.
    pub fn ends_with(&self, suffix: &BitString) -> bool {
        self.bits.ends_with(&suffix.bits)
    }

    /// Shortens the bit string to `len` bits.
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    /// Iterates over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.bits.iter().copied()
    }

    /// The bits as a slice of `0`/`1` values.
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit == 0 { "0" } else { "1" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({} bits: {})", self.bits.len(), self)
    }
}

impl FromStr for BitString {
    type Err = ParseBitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = BitString::with_capacity(s.len());
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(0),
                '1' => bits.push(1),
                found => return Err(ParseBitsError { position, found }),
            }
        }
        Ok(bits)
    }
}

impl FromIterator<u8> for BitString {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut bits = BitString::new();
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

/// Expands each byte into its 8 bits, most significant first.
pub fn to_bits(bytes: &[u8]) -> BitString {
    let mut bits = BitString::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Packs bits back into bytes, most significant first.
///
/// A trailing group shorter than 8 bits is dropped.
pub fn from_bits(bits: &BitString) -> Vec<u8> {
    bits.as_slice()
        .chunks_exact(8)
        .map(|group| group.iter().fold(0u8, |acc, bit| (acc << 1) | bit))
        .collect()
}
