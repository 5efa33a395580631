//! LSB steganography for video.
//!
//! Units are the RGB24 bytes of every frame, concatenated in temporal order.
//! Frames are streamed: each one is embedded in place (the bit offset runs on
//! across frame boundaries) and handed to the sink straight away, and once
//! the bits run out the remaining frames are copied through untouched.
//!
//! Decoding and encoding frames is left to a [`VideoSource`] and a
//! [`VideoSink`]. The sink must be lossless; any codec that perturbs pixel
//! values destroys the payload.

use super::{check_capacity, embed_lsb, Carrier, Delimiter, DelimiterScanner};
use crate::bits::BitString;
use crate::error::StegoError;

/// Stream properties known before the first frame is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: usize,
}

impl VideoInfo {
    /// Bytes in one RGB24 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Total units across all frames.
    pub fn capacity_bits(&self) -> usize {
        self.frame_len() * self.frame_count
    }
}

/// A sequence of decoded RGB24 frames.
pub trait VideoSource {
    /// Properties probed from the container.
    fn info(&self) -> VideoInfo;

    /// Returns the next frame, or `None` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, StegoError>;
}

/// A lossless destination for RGB24 frames.
pub trait VideoSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), StegoError>;

    /// Flushes and closes the output. Called once after the last frame.
    fn finish(&mut self) -> Result<(), StegoError>;
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    fn info(&self) -> VideoInfo {
        (**self).info()
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, StegoError> {
        (**self).next_frame()
    }
}

impl<W: VideoSink + ?Sized> VideoSink for &mut W {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), StegoError> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<(), StegoError> {
        (**self).finish()
    }
}

/// Sink that drops every frame. Used when a video is only read.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl VideoSink for Discard {
    fn write_frame(&mut self, _frame: &[u8]) -> Result<(), StegoError> {
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StegoError> {
        Ok(())
    }
}

/// In-memory video, usable both as a source and as a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryVideo {
    width: u32,
    height: u32,
    fps: f64,
    frames: Vec<Vec<u8>>,
    cursor: usize,
}

impl MemoryVideo {
    /// Creates an empty video, ready to receive frames.
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            frames: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates a video from existing frames, checking every frame's size.
    pub fn from_frames(width: u32, height: u32, fps: f64, frames: Vec<Vec<u8>>) -> Result<Self, StegoError> {
        let mut video = Self::new(width, height, fps);
        for frame in &frames {
            video.check_frame(frame)?;
        }
        video.frames = frames;
        Ok(video)
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    fn check_frame(&self, frame: &[u8]) -> Result<(), StegoError> {
        let expected = self.info().frame_len();
        if frame.len() != expected {
            return Err(StegoError::Media(format!(
                "frame is {} bytes, expected {}",
                frame.len(),
                expected
            )));
        }
        Ok(())
    }
}

impl VideoSource for MemoryVideo {
    fn info(&self) -> VideoInfo {
        VideoInfo {
            width: self.width,
            height: self.height,
            fps: self.fps,
            frame_count: self.frames.len(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, StegoError> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }
}

impl VideoSink for MemoryVideo {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), StegoError> {
        self.check_frame(frame)?;
        self.frames.push(frame.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StegoError> {
        Ok(())
    }
}

/// Video carrier over a frame source and an output sink.
///
/// The source is consumed by a single `embed` or `extract_bits` pass.
pub struct VideoCarrier<S, W = Discard> {
    source: S,
    sink: W,
    info: VideoInfo,
}

impl<S: VideoSource> VideoCarrier<S, Discard> {
    /// Carrier for extraction only.
    pub fn reader(source: S) -> Self {
        Self::new(source, Discard)
    }
}

impl<S: VideoSource, W: VideoSink> VideoCarrier<S, W> {
    pub fn new(source: S, sink: W) -> Self {
        let info = source.info();
        Self { source, sink, info }
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    /// Consumes the carrier and returns the sink holding the output frames.
    pub fn into_sink(self) -> W {
        self.sink
    }

    fn next_checked_frame(&mut self) -> Result<Option<Vec<u8>>, StegoError> {
        let frame = self.source.next_frame()?;
        if let Some(frame) = &frame {
            if frame.len() != self.info.frame_len() {
                return Err(StegoError::Media(format!(
                    "decoded frame is {} bytes, expected {}",
                    frame.len(),
                    self.info.frame_len()
                )));
            }
        }
        Ok(frame)
    }
}

impl<S: VideoSource, W: VideoSink> Carrier for VideoCarrier<S, W> {
    fn capacity_bits(&self) -> usize {
        self.info.capacity_bits()
    }

    /// Checks the probed capacity before the first frame is written, so an
    /// oversized payload never leaves partial output behind.
    fn embed(&mut self, bits: &BitString) -> Result<(), StegoError> {
        check_capacity(bits.len(), self.capacity_bits())?;

        let bits = bits.as_slice();
        let mut offset = 0;
        let mut frames = 0;
        while let Some(mut frame) = self.next_checked_frame()? {
            if offset < bits.len() {
                offset += embed_lsb(&mut frame, &bits[offset..]);
            }
            self.sink.write_frame(&frame)?;
            frames += 1;
        }

        // The container reported more frames than it delivered.
        if offset < bits.len() {
            return Err(StegoError::CapacityExceeded {
                needed: bits.len(),
                capacity: offset,
            });
        }
        if frames < self.info.frame_count {
            return Err(StegoError::Media(format!(
                "source delivered {} of {} frames",
                frames, self.info.frame_count
            )));
        }

        self.sink.finish()
    }

    fn extract_bits(
        &mut self,
        delimiter: &Delimiter,
        max_bits: Option<usize>,
    ) -> Result<BitString, StegoError> {
        let mut scanner = DelimiterScanner::new(delimiter, max_bits);
        while !scanner.is_done() {
            match self.next_checked_frame()? {
                Some(frame) => {
                    scanner.feed(&frame);
                }
                None => break,
            }
        }
        scanner.finish()
    }
}
