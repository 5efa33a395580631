//! Progress events emitted while hiding and revealing.
//!
//! The core never prints. It hands [`Event`]s to an injected [`Reporter`];
//! the CLI uses [`LogReporter`], which forwards them to the `log` facade.

use log::{debug, info};

/// Something that happened during a hide or reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The plaintext was encrypted and framed.
    Sealed {
        plaintext_bytes: usize,
        payload_bytes: usize,
        stream_bits: usize,
    },
    /// The bit stream was compared against the carrier.
    CapacityChecked { needed: usize, capacity: usize },
    /// Bits were written into the carrier.
    Embedded { bits: usize },
    /// The delimiter was located during extraction.
    PayloadExtracted { payload_bits: usize },
    /// The payload decrypted cleanly.
    Revealed { plaintext_bytes: usize },
}

/// Receives progress events from a `Steganographer`.
pub trait Reporter {
    fn report(&self, event: &Event);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &Event) {
        (**self).report(event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Reporter for Silent {
    fn report(&self, _event: &Event) {}
}

/// Forwards events to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &Event) {
        match event {
            Event::Sealed {
                plaintext_bytes,
                payload_bytes,
                stream_bits,
            } => debug!(
                "sealed {} plaintext bytes into {} payload bytes ({} bits with delimiter)",
                plaintext_bytes, payload_bytes, stream_bits
            ),
            Event::CapacityChecked { needed, capacity } => {
                debug!("capacity check: {} of {} bits", needed, capacity)
            }
            Event::Embedded { bits } => info!("embedded {} bits", bits),
            Event::PayloadExtracted { payload_bits } => {
                debug!("delimiter found after {} payload bits", payload_bits)
            }
            Event::Revealed { plaintext_bytes } => {
                info!("revealed {} bytes", plaintext_bytes)
            }
        }
    }
}
