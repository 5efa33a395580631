//! Hiding and revealing encrypted text in carriers.
//!
//! The embedded stream is `bits(salt || token) || delimiter`, where `token`
//! is the base64 ChaCha20-Poly1305 ciphertext produced by [`crate::crypto`].
//! [`Steganographer`] drives a [`Carrier`] through that pipeline; the
//! `*_file` helpers pick the carrier from the file extension and do the I/O.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::path::Path;

use crate::bits::{from_bits, to_bits, BitString};
use crate::carrier::{
    check_capacity, AudioCarrier, Carrier, Delimiter, ImageCarrier, VideoCarrier, VideoSource,
};
use crate::config::StegoConfig;
use crate::crypto::{self, payload_len, SALT_SIZE};
use crate::error::StegoError;
use crate::media::{probe, FfmpegTranscoder, FfmpegVideoReader, FfmpegVideoWriter, MediaKind};
use crate::report::{Event, LogReporter, Reporter};

/// How much a carrier can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Units in the carrier, one hidden bit each.
    pub total_bits: usize,
    /// Bits an empty message occupies: salt, nonce, tag, base64 padding and
    /// delimiter.
    pub overhead_bits: usize,
    /// Longest plaintext that fits, or `None` if not even an empty message
    /// does.
    pub max_plaintext_bytes: Option<usize>,
}

impl Capacity {
    /// Computes the capacity of a carrier with `total_bits` units.
    pub fn for_bits(total_bits: usize, delimiter_bits: usize) -> Self {
        let overhead_bits = stream_bits(0, delimiter_bits);
        let max_plaintext_bytes = if total_bits < overhead_bits {
            None
        } else {
            // payload_len(n) = 16 + 4 * ceil((28 + n) / 3)
            let payload_bytes = (total_bits - delimiter_bits) / 8;
            let groups = (payload_bytes - SALT_SIZE) / 4;
            Some(groups * 3 - (crypto::NONCE_SIZE + crypto::TAG_SIZE))
        };

        Self {
            total_bits,
            overhead_bits,
            max_plaintext_bytes,
        }
    }

    /// Returns true if a `plaintext_len`-byte message fits.
    pub fn fits(&self, plaintext_len: usize) -> bool {
        self.max_plaintext_bytes.is_some_and(|max| plaintext_len <= max)
    }
}

/// Total embedded bits for a plaintext of `plaintext_len` bytes.
pub fn stream_bits(plaintext_len: usize, delimiter_bits: usize) -> usize {
    payload_len(plaintext_len) * 8 + delimiter_bits
}

/// Hides and reveals messages according to a [`StegoConfig`].
pub struct Steganographer<R = LogReporter> {
    config: StegoConfig,
    delimiter: Delimiter,
    reporter: R,
}

impl Steganographer<LogReporter> {
    /// Creates a steganographer that logs through the `log` crate.
    pub fn new(config: StegoConfig) -> Self {
        Self::with_reporter(config, LogReporter)
    }
}

impl<R: Reporter> Steganographer<R> {
    pub fn with_reporter(config: StegoConfig, reporter: R) -> Self {
        Self {
            config,
            delimiter: Delimiter::default(),
            reporter,
        }
    }

    /// Replaces the end-of-payload delimiter. Both sides must agree on it.
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    /// Encrypts `plaintext` and returns the delimited bit stream to embed.
    pub fn seal(&self, plaintext: &str, secret: &str) -> Result<BitString, StegoError> {
        self.seal_with_rng(plaintext, secret, &mut OsRng)
    }

    /// Like [`seal`](Self::seal), drawing salt and nonce from `rng`.
    pub fn seal_with_rng<G: RngCore + CryptoRng>(
        &self,
        plaintext: &str,
        secret: &str,
        rng: &mut G,
    ) -> Result<BitString, StegoError> {
        let payload = crypto::seal(plaintext.as_bytes(), secret, rng)?;
        let stream = self.delimiter.terminate(&to_bits(&payload));

        self.reporter.report(&Event::Sealed {
            plaintext_bytes: plaintext.len(),
            payload_bytes: payload.len(),
            stream_bits: stream.len(),
        });
        Ok(stream)
    }

    /// Encrypts `plaintext` and embeds it into `carrier`.
    ///
    /// Fails with [`StegoError::CapacityExceeded`] before the carrier is
    /// touched if the message does not fit.
    pub fn hide<C: Carrier + ?Sized>(
        &self,
        carrier: &mut C,
        plaintext: &str,
        secret: &str,
    ) -> Result<(), StegoError> {
        let stream = self.seal(plaintext, secret)?;
        self.embed_stream(carrier, &stream)
    }

    /// Like [`hide`](Self::hide), drawing salt and nonce from `rng`.
    pub fn hide_with_rng<C: Carrier + ?Sized, G: RngCore + CryptoRng>(
        &self,
        carrier: &mut C,
        plaintext: &str,
        secret: &str,
        rng: &mut G,
    ) -> Result<(), StegoError> {
        let stream = self.seal_with_rng(plaintext, secret, rng)?;
        self.embed_stream(carrier, &stream)
    }

    /// Embeds an already sealed stream.
    pub fn embed_stream<C: Carrier + ?Sized>(
        &self,
        carrier: &mut C,
        stream: &BitString,
    ) -> Result<(), StegoError> {
        let capacity = carrier.capacity_bits();
        self.reporter.report(&Event::CapacityChecked {
            needed: stream.len(),
            capacity,
        });
        check_capacity(stream.len(), capacity)?;

        carrier.embed(stream)?;
        self.reporter.report(&Event::Embedded { bits: stream.len() });
        Ok(())
    }

    /// Extracts and decrypts the message hidden in `carrier`.
    pub fn reveal<C: Carrier + ?Sized>(
        &self,
        carrier: &mut C,
        secret: &str,
    ) -> Result<String, StegoError> {
        let budget = carrier.scan_budget(self.config.max_scan_bits);
        let bits = carrier.extract_bits(&self.delimiter, budget)?;
        self.reporter.report(&Event::PayloadExtracted {
            payload_bits: bits.len(),
        });

        let payload = from_bits(&bits);
        if payload.len() < SALT_SIZE {
            return Err(StegoError::InsufficientData { len: payload.len() });
        }

        let plaintext = crypto::open(&payload, secret)?;
        let text = String::from_utf8(plaintext).map_err(|_| StegoError::InvalidText)?;
        self.reporter.report(&Event::Revealed {
            plaintext_bytes: text.len(),
        });
        Ok(text)
    }

    /// Reports how much `carrier` can hold.
    pub fn capacity_report<C: Carrier + ?Sized>(&self, carrier: &C) -> Capacity {
        Capacity::for_bits(carrier.capacity_bits(), self.delimiter.len())
    }

    /// Hides `plaintext` in the carrier file `input` and writes the result
    /// to `output`.
    ///
    /// The carrier type comes from the extension of `input`. `output` must
    /// carry the lossless extension of that type (`png`, `mkv` or `wav`).
    /// Nothing is written if the message does not fit.
    pub fn encode_file(
        &self,
        input: &Path,
        output: &Path,
        plaintext: &str,
        secret: &str,
    ) -> Result<(), StegoError> {
        let kind = MediaKind::from_path(input)?;
        check_output_extension(kind, output)?;

        match kind {
            MediaKind::Image => {
                let mut carrier = ImageCarrier::from_file(input)?;
                self.hide(&mut carrier, plaintext, secret)?;
                carrier.save(output)
            }
            MediaKind::Audio => {
                let transcoder = FfmpegTranscoder::new(self.config.ffmpeg.clone());
                let mut carrier = AudioCarrier::from_file(input, &transcoder)?;
                self.hide(&mut carrier, plaintext, secret)?;
                carrier.save(output)
            }
            MediaKind::Video => {
                let stream = self.seal(plaintext, secret)?;
                self.encode_video(input, output, &stream)
            }
        }
    }

    fn encode_video(&self, input: &Path, output: &Path, stream: &BitString) -> Result<(), StegoError> {
        let reader = FfmpegVideoReader::open(&self.config.ffmpeg, input)?;
        let info = reader.info();
        check_capacity(stream.len(), info.capacity_bits())?;

        // Frames go to a temporary file next to the output, which only
        // replaces `output` once ffmpeg has finished cleanly.
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".lsbhide-")
            .suffix(".mkv")
            .tempfile_in(dir)?;

        let writer = FfmpegVideoWriter::create(&self.config.ffmpeg, staging.path(), &info)?;
        let mut carrier = VideoCarrier::new(reader, writer);
        self.embed_stream(&mut carrier, stream)?;
        drop(carrier);

        staging.persist(output).map_err(|e| StegoError::Io(e.error))?;
        Ok(())
    }

    /// Reveals the message hidden in the carrier file `path`.
    pub fn decode_file(&self, path: &Path, secret: &str) -> Result<String, StegoError> {
        match MediaKind::from_path(path)? {
            MediaKind::Image => self.reveal(&mut ImageCarrier::from_file(path)?, secret),
            MediaKind::Audio => {
                let transcoder = FfmpegTranscoder::new(self.config.ffmpeg.clone());
                self.reveal(&mut AudioCarrier::from_file(path, &transcoder)?, secret)
            }
            MediaKind::Video => {
                let reader = FfmpegVideoReader::open(&self.config.ffmpeg, path)?;
                self.reveal(&mut VideoCarrier::reader(reader), secret)
            }
        }
    }

    /// Reports the capacity of the carrier file `path` without modifying it.
    pub fn probe_file(&self, path: &Path) -> Result<(MediaKind, Capacity), StegoError> {
        let kind = MediaKind::from_path(path)?;
        let total_bits = match kind {
            MediaKind::Image => ImageCarrier::from_file(path)?.capacity_bits(),
            MediaKind::Audio => {
                let transcoder = FfmpegTranscoder::new(self.config.ffmpeg.clone());
                AudioCarrier::from_file(path, &transcoder)?.capacity_bits()
            }
            MediaKind::Video => probe(&self.config.ffmpeg, path)?.capacity_bits(),
        };
        Ok((kind, Capacity::for_bits(total_bits, self.delimiter.len())))
    }
}

fn check_output_extension(kind: MediaKind, output: &Path) -> Result<(), StegoError> {
    let expected = kind.output_extension();
    let matches = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected));
    if !matches {
        return Err(StegoError::UnsupportedFormat(format!(
            "{} output must be written as .{}, got {}",
            kind,
            expected,
            output.display()
        )));
    }
    Ok(())
}
