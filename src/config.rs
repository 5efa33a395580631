//! Configuration for lsbhide.
//!
//! Settings are read from `~/.lsbhide/config.toml`; a missing file means
//! defaults. Example:
//!
//! ```toml
//! max_scan_bits = 1000000
//!
//! [ffmpeg]
//! ffmpeg = "/usr/local/bin/ffmpeg"
//! ffprobe = "/usr/local/bin/ffprobe"
//! video_codec = "ffv1"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::media::FfmpegConfig;

/// Default upper bound on bits read while looking for the delimiter.
pub const DEFAULT_MAX_SCAN_BITS: usize = 1_000_000;

/// Errors that can occur while loading or saving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Tunables shared by every hide/reveal operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StegoConfig {
    /// Bits read from audio and video carriers before giving up on the
    /// delimiter. Images are always scanned to the end.
    pub max_scan_bits: usize,

    /// External tools used for video and non-WAV audio.
    pub ffmpeg: FfmpegConfig,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            max_scan_bits: DEFAULT_MAX_SCAN_BITS,
            ffmpeg: FfmpegConfig::default(),
        }
    }
}

impl StegoConfig {
    /// Loads the configuration from the default location, falling back to
    /// defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads the configuration from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: StegoConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Path to the default configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_scan_bits == 0 {
            return Err(ConfigError::Invalid("max_scan_bits must be greater than zero".into()));
        }
        if self.ffmpeg.video_codec.trim().is_empty() {
            return Err(ConfigError::Invalid("ffmpeg.video_codec must not be empty".into()));
        }
        Ok(())
    }
}

/// Returns `~/.lsbhide`.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".lsbhide"))
        .ok_or(ConfigError::NoConfigDir)
}
