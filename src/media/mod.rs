//! Media boundary: carrier-type detection, extension whitelist and the
//! ffmpeg bridge.

pub mod ffmpeg;

pub use ffmpeg::{probe, FfmpegConfig, FfmpegTranscoder, FfmpegVideoReader, FfmpegVideoWriter};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::StegoError;

/// Image extensions accepted as carriers.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "jpg", "jpeg", "gif", "tif", "tiff", "webp"];

/// Video extensions accepted as carriers.
pub const VIDEO_EXTENSIONS: &[&str] = &["avi", "mp4", "mov", "mkv"];

/// Audio extensions accepted as carriers.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// The three kinds of carrier media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Detects the carrier kind from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, StegoError> {
        let ext = extension(path)?;
        [MediaKind::Image, MediaKind::Video, MediaKind::Audio]
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
            .ok_or_else(|| {
                StegoError::UnsupportedFormat(format!("unrecognised carrier extension '.{}'", ext))
            })
    }

    /// Extensions allowed for this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Audio => AUDIO_EXTENSIONS,
        }
    }

    /// Extension of the files this crate writes for this kind.
    pub fn output_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "png",
            MediaKind::Video => "mkv",
            MediaKind::Audio => "wav",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        })
    }
}

impl FromStr for MediaKind {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(StegoError::UnsupportedFormat(format!("unknown media kind '{}'", other))),
        }
    }
}

fn extension(path: &Path) -> Result<String, StegoError> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| {
            StegoError::UnsupportedFormat(format!("{} has no file extension", path.display()))
        })
}
