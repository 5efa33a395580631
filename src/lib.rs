//! # lsbhide - password-protected LSB steganography
//!
//! lsbhide hides an encrypted text message in the least significant bits of
//! an image, a video or an audio file.
//!
//! ## Overview
//!
//! - The password is stretched with **PBKDF2-HMAC-SHA256** (100,000
//!   iterations, random 16-byte salt)
//! - The message is sealed with **ChaCha20-Poly1305**; a wrong password or a
//!   tampered carrier fails authentication instead of yielding garbage
//! - `salt || ciphertext` is turned into bits and terminated by a fixed
//!   32-bit delimiter
//! - Bit `i` replaces the LSB of byte `i` of the carrier: RGB bytes for
//!   images and video frames, PCM bytes for audio
//! - Output is always lossless: PNG, FFV1 Matroska or 16-bit PCM WAV
//!
//! ## Example Usage
//!
//! ```rust
//! use image::{DynamicImage, RgbImage};
//! use lsbhide::carrier::ImageCarrier;
//! use lsbhide::report::Silent;
//! use lsbhide::{StegoConfig, Steganographer};
//!
//! let stego = Steganographer::with_reporter(StegoConfig::default(), Silent);
//! let mut carrier = ImageCarrier::from_image(DynamicImage::ImageRgb8(RgbImage::new(64, 64)));
//!
//! stego.hide(&mut carrier, "hello", "pw123").unwrap();
//! assert_eq!(stego.reveal(&mut carrier, "pw123").unwrap(), "hello");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: key derivation, AEAD and the payload format
//! - [`bits`]: byte/bit conversion
//! - [`carrier`]: the `Carrier` trait, delimiter scanning and the three
//!   media carriers
//! - [`media`]: carrier type detection and the ffmpeg bridge
//! - [`stego`]: the hide/reveal pipeline
//! - [`config`], [`report`], [`error`]: configuration, progress events and
//!   the error taxonomy

pub mod bits;
pub mod carrier;
pub mod config;
pub mod crypto;
pub mod error;
pub mod media;
pub mod report;
pub mod stego;

pub use bits::BitString;
pub use carrier::{Carrier, Delimiter};
pub use config::StegoConfig;
pub use error::{ErrorKind, StegoError};
pub use media::MediaKind;
pub use report::{LogReporter, Reporter};
pub use stego::{Capacity, Steganographer};

/// Version of the lsbhide library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
