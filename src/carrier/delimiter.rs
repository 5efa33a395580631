//! End-of-payload sentinel and the sequential scan that looks for it.
//!
//! A plain sequential scan stops at the first position where the trailing
//! bits equal the delimiter. This scanner is stricter: a match only counts
//! when the bits before it form whole bytes. The periodic default pattern
//! would otherwise match early inside any payload ending in `...10`, and
//! the ciphertext is base64 text, so a byte-aligned false match can only
//! come from the random salt. Carriers written by a tool that accepts
//! unaligned matches decode the same way unless their payload bit count is
//! not a multiple of eight, in which case the delimiter is not found.

use crate::bits::BitString;
use crate::error::StegoError;

/// The sentinel appended after every payload: `10` repeated 16 times.
pub const DEFAULT_PATTERN: &str = "10101010101010101010101010101010";

/// Bit pattern marking the end of the hidden payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    bits: BitString,
}

impl Delimiter {
    /// Creates a delimiter from an arbitrary non-empty bit pattern.
    pub fn new(bits: BitString) -> Result<Self, StegoError> {
        if bits.is_empty() {
            return Err(StegoError::UnsupportedFormat("empty delimiter".into()));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    /// Length of the pattern in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns `payload` followed by the delimiter.
    pub fn terminate(&self, payload: &BitString) -> BitString {
        let mut out = BitString::with_capacity(payload.len() + self.len());
        out.extend(payload);
        out.extend(&self.bits);
        out
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        let bits = DEFAULT_PATTERN
            .bytes()
            .map(|c| (c == b'1') as u8)
            .collect();
        Self { bits }
    }
}

/// Consumes carrier LSBs one at a time until the delimiter shows up.
///
/// After each bit the trailing window is compared with the delimiter. On a
/// match scanning stops and [`DelimiterScanner::finish`] returns everything
/// read before the delimiter.
///
/// Payloads are whole bytes, so a window is only accepted when the bits in
/// front of it are a multiple of 8. Without this a payload ending in `10`
/// would merge with the periodic default pattern and match two bits early.
pub struct DelimiterScanner<'a> {
    delimiter: &'a Delimiter,
    read: BitString,
    max_bits: Option<usize>,
    found: bool,
}

impl<'a> DelimiterScanner<'a> {
    /// Creates a scanner that gives up after `max_bits` bits, or only at the
    /// end of the carrier when `max_bits` is `None`.
    pub fn new(delimiter: &'a Delimiter, max_bits: Option<usize>) -> Self {
        Self {
            delimiter,
            read: BitString::new(),
            max_bits,
            found: false,
        }
    }

    /// Feeds the LSB of each unit in order.
    ///
    /// Returns `true` once scanning is over, either because the delimiter was
    /// found or because the bit budget is spent.
    pub fn feed(&mut self, units: &[u8]) -> bool {
        for unit in units {
            if self.is_done() {
                break;
            }
            self.read.push(unit & 1);
            let len = self.read.len();
            if len >= self.delimiter.len()
                && (len - self.delimiter.len()) % 8 == 0
                && self.read.ends_with(self.delimiter.bits())
            {
                self.found = true;
            }
        }
        self.is_done()
    }

    /// True when the delimiter has been found or the budget is spent.
    pub fn is_done(&self) -> bool {
        self.found || self.max_bits.is_some_and(|max| self.read.len() >= max)
    }

    /// Number of bits read so far.
    pub fn scanned(&self) -> usize {
        self.read.len()
    }

    /// Returns the bits preceding the delimiter.
    pub fn finish(self) -> Result<BitString, StegoError> {
        if !self.found {
            return Err(StegoError::DelimiterNotFound {
                scanned: self.read.len(),
            });
        }
        let mut payload = self.read;
        payload.truncate(payload.len() - self.delimiter.len());
        Ok(payload)
    }
}
