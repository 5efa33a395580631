//! Error taxonomy for hiding and revealing payloads.
//!
//! Every failure the core can produce is a [`StegoError`]. Callers that need
//! to tell "wrong password" apart from "not a stego file" should branch on
//! [`StegoError::kind`] instead of matching on messages.

use thiserror::Error;

use crate::crypto::CryptoError;

/// Coarse category of a [`StegoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The payload does not fit into the carrier.
    CapacityExceeded,
    /// No delimiter was found: wrong file, wrong carrier type or corrupted data.
    DelimiterNotFound,
    /// Decryption failed: wrong password or tampered ciphertext.
    Authentication,
    /// The extracted payload is shorter than the salt prefix.
    InsufficientData,
    /// The carrier file cannot be read or its type is not allowed.
    UnsupportedFormat,
    /// Anything else (I/O, codec or subprocess failures).
    Other,
}

/// Errors that can occur while hiding or revealing a payload.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Carrier too small: payload needs {needed} bits, carrier holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("End delimiter not found after scanning {scanned} bits")]
    DelimiterNotFound { scanned: usize },

    #[error("Authentication failed: wrong password or corrupted data")]
    Authentication,

    #[error("Extracted payload too short: {len} bytes, salt alone needs 16")]
    InsufficientData { len: usize },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Hidden message is not valid UTF-8 text")]
    InvalidText,

    #[error("Encryption error: {0}")]
    Crypto(CryptoError),

    #[error("Media error: {0}")]
    Media(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StegoError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StegoError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            StegoError::DelimiterNotFound { .. } => ErrorKind::DelimiterNotFound,
            StegoError::Authentication => ErrorKind::Authentication,
            StegoError::InsufficientData { .. } => ErrorKind::InsufficientData,
            StegoError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            StegoError::InvalidText
            | StegoError::Crypto(_)
            | StegoError::Media(_)
            | StegoError::Io(_) => ErrorKind::Other,
        }
    }
}

impl From<CryptoError> for StegoError {
    fn from(err: CryptoError) -> Self {
        match err {
            // A truncated ciphertext after a successful delimiter scan is
            // indistinguishable from a wrong key.
            CryptoError::AuthenticationFailed | CryptoError::CiphertextTooShort => {
                StegoError::Authentication
            }
            CryptoError::MissingSalt(len) => StegoError::InsufficientData { len },
            other => StegoError::Crypto(other),
        }
    }
}

impl From<image::ImageError> for StegoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => StegoError::Io(e),
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                StegoError::UnsupportedFormat(err.to_string())
            }
            other => StegoError::Media(other.to_string()),
        }
    }
}

impl From<hound::Error> for StegoError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => StegoError::Io(e),
            hound::Error::FormatError(_) | hound::Error::Unsupported => {
                StegoError::UnsupportedFormat(err.to_string())
            }
            other => StegoError::Media(other.to_string()),
        }
    }
}
