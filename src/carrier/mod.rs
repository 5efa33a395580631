//! Carriers: media whose bytes can each hide one bit in their LSB.
//!
//! Every carrier exposes a flat, ordered sequence of byte units. Bit `i` of
//! the embedded stream lives in the LSB of unit `i`.
//!
//! Supports:
//! - Images (RGB bytes of a single frame, written back as PNG)
//! - Video (RGB bytes of every frame in temporal order)
//! - Audio (canonical 16-bit PCM bytes)

pub mod audio;
pub mod delimiter;
pub mod image;
pub mod video;

pub use self::audio::{AudioCarrier, Transcoder};
pub use self::delimiter::{Delimiter, DelimiterScanner, DEFAULT_PATTERN};
pub use self::image::ImageCarrier;
pub use self::video::{Discard, MemoryVideo, VideoCarrier, VideoInfo, VideoSink, VideoSource};

use crate::bits::BitString;
use crate::error::StegoError;

/// The contract every carrier implements.
pub trait Carrier {
    /// Total number of addressable units, i.e. bits that can be hidden.
    fn capacity_bits(&self) -> usize;

    /// Overwrites the LSB of unit `i` with bit `i` for every bit in `bits`.
    ///
    /// Units past the end of `bits` are left untouched. Fails with
    /// [`StegoError::CapacityExceeded`] before modifying anything if `bits`
    /// is longer than the carrier.
    fn embed(&mut self, bits: &BitString) -> Result<(), StegoError>;

    /// Reads LSBs in unit order until `delimiter` is found and returns the
    /// bits before it.
    ///
    /// Gives up with [`StegoError::DelimiterNotFound`] when the carrier runs
    /// out or `max_bits` bits have been read.
    fn extract_bits(
        &mut self,
        delimiter: &Delimiter,
        max_bits: Option<usize>,
    ) -> Result<BitString, StegoError>;

    /// Scan limit to use given the configured budget. Bounded by default.
    fn scan_budget(&self, configured: usize) -> Option<usize> {
        Some(configured)
    }
}

/// Fails with [`StegoError::CapacityExceeded`] if `needed` bits do not fit.
pub fn check_capacity(needed: usize, capacity: usize) -> Result<(), StegoError> {
    if needed > capacity {
        return Err(StegoError::CapacityExceeded { needed, capacity });
    }
    Ok(())
}

/// Writes `bits` into the LSBs of `units`, stopping at whichever runs out
/// first. Returns the number of bits written.
pub(crate) fn embed_lsb(units: &mut [u8], bits: &[u8]) -> usize {
    let written = units.len().min(bits.len());
    for (unit, bit) in units.iter_mut().zip(bits) {
        *unit = (*unit & !1) | (bit & 1);
    }
    written
}

/// Embeds into a carrier that lives entirely in one buffer.
pub(crate) fn embed_flat(units: &mut [u8], bits: &BitString) -> Result<(), StegoError> {
    check_capacity(bits.len(), units.len())?;
    embed_lsb(units, bits.as_slice());
    Ok(())
}

/// Runs the delimiter scan over a carrier that lives entirely in one buffer.
pub(crate) fn extract_flat(
    units: &[u8],
    delimiter: &Delimiter,
    max_bits: Option<usize>,
) -> Result<BitString, StegoError> {
    let mut scanner = DelimiterScanner::new(delimiter, max_bits);
    scanner.feed(units);
    scanner.finish()
}
