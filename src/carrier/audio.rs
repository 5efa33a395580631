//! LSB steganography for audio.
//!
//! Audio is canonicalized to 16-bit signed little-endian PCM WAV before any
//! embedding or extraction; sample rate and channel count are kept. Every
//! byte of the PCM data (both bytes of each sample, in file order) is one
//! unit. Encode and decode must canonicalize the same way or the unit
//! offsets drift apart, which shows up as a missing delimiter.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use super::{embed_flat, extract_flat, Carrier, Delimiter};
use crate::bits::BitString;
use crate::error::StegoError;

/// Canonical PCM sample width.
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

/// Converts arbitrary audio files into canonical WAV bytes.
pub trait Transcoder {
    fn to_canonical_wav(&self, input: &Path) -> Result<Vec<u8>, StegoError>;
}

/// Audio carrier holding canonical PCM bytes.
pub struct AudioCarrier {
    spec: WavSpec,
    pcm: Vec<u8>,
}

impl AudioCarrier {
    /// Loads a WAV file, canonicalizing its samples to 16-bit PCM.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let reader = WavReader::open(path)?;
        Self::from_reader(reader)
    }

    /// Loads WAV bytes, canonicalizing its samples to 16-bit PCM.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        Self::from_reader(reader)
    }

    /// Loads any audio file. PCM WAV is read directly; everything else,
    /// including WAV codecs `hound` cannot decode (µ-law, A-law, ADPCM),
    /// goes through `transcoder` first.
    pub fn from_file<P: AsRef<Path>>(path: P, transcoder: &dyn Transcoder) -> Result<Self, StegoError> {
        let path = path.as_ref();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

        if is_wav {
            match Self::from_wav_file(path) {
                Err(StegoError::UnsupportedFormat(reason)) => {
                    debug!("{}: {}, transcoding", path.display(), reason);
                }
                result => return result,
            }
        }

        let wav = transcoder.to_canonical_wav(path)?;
        Self::from_wav_bytes(&wav)
    }

    /// Builds a carrier from 16-bit samples (interleaved by channel).
    pub fn from_samples(channels: u16, sample_rate: u32, samples: &[i16]) -> Self {
        Self {
            spec: canonical_spec(channels, sample_rate),
            pcm: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self, StegoError> {
        let source = reader.spec();
        let samples: Vec<i16> = match (source.sample_format, source.bits_per_sample) {
            (SampleFormat::Int, 16) => reader.into_samples::<i16>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits) if bits <= 32 => reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| rescale_int(s, bits)))
                .collect::<Result<_, _>>()?,
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .map(|s| s.map(rescale_float))
                .collect::<Result<_, _>>()?,
            (format, bits) => {
                return Err(StegoError::UnsupportedFormat(format!(
                    "{} bit {:?} WAV samples",
                    bits, format
                )))
            }
        };

        Ok(Self::from_samples(source.channels, source.sample_rate, &samples))
    }

    /// The canonical WAV spec used for output.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Number of 16-bit samples across all channels.
    pub fn sample_count(&self) -> usize {
        self.pcm.len() / 2
    }

    /// The raw PCM bytes.
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    /// Saves the audio as a canonical WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        let writer = WavWriter::create(path, self.spec)?;
        self.write_samples(writer)
    }

    /// Returns the audio as canonical WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        {
            let writer = WavWriter::new(Cursor::new(&mut bytes), self.spec)?;
            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<(), StegoError> {
        for pair in self.pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        writer.finalize()?;
        Ok(())
    }
}

impl Carrier for AudioCarrier {
    fn capacity_bits(&self) -> usize {
        self.pcm.len()
    }

    fn embed(&mut self, bits: &BitString) -> Result<(), StegoError> {
        embed_flat(&mut self.pcm, bits)
    }

    fn extract_bits(
        &mut self,
        delimiter: &Delimiter,
        max_bits: Option<usize>,
    ) -> Result<BitString, StegoError> {
        extract_flat(&self.pcm, delimiter, max_bits)
    }
}

fn canonical_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: CANONICAL_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

fn rescale_int(sample: i32, bits: u16) -> i16 {
    if bits <= 16 {
        (sample << (16 - bits)) as i16
    } else {
        (sample >> (bits - 16)) as i16
    }
}

fn rescale_float(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
