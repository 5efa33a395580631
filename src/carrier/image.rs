//! LSB steganography for still images.
//!
//! The image is converted to 8-bit RGB and its pixel buffer is used as the
//! unit sequence: raster order, R, G, B per pixel. Output is always PNG so
//! no lossy compression touches the LSBs.

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

use super::{embed_flat, extract_flat, Carrier, Delimiter};
use crate::bits::BitString;
use crate::error::StegoError;

/// Still image carrier.
pub struct ImageCarrier {
    pixels: RgbImage,
}

impl ImageCarrier {
    /// Loads an image from a file. Any format the `image` crate decodes works.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let image = image::open(path)?;
        Ok(Self::from_image(image))
    }

    /// Loads an image from encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(image))
    }

    /// Wraps a decoded image, dropping any alpha channel.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgb8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Saves the image as PNG, whatever the extension of `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        self.pixels.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Returns a reference to the pixel buffer.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

impl Carrier for ImageCarrier {
    fn capacity_bits(&self) -> usize {
        self.pixels.as_raw().len()
    }

    fn embed(&mut self, bits: &BitString) -> Result<(), StegoError> {
        embed_flat(&mut self.pixels, bits)
    }

    fn extract_bits(
        &mut self,
        delimiter: &Delimiter,
        max_bits: Option<usize>,
    ) -> Result<BitString, StegoError> {
        extract_flat(self.pixels.as_raw(), delimiter, max_bits)
    }

    /// Images are small enough to scan completely.
    fn scan_budget(&self, _configured: usize) -> Option<usize> {
        None
    }
}
