//! Raster images painted on a page.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sample layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorKind {
    /// One bit per pixel, rows padded to whole bytes, 1 = white.
    Grayscale1Bpp,
    /// Three 8-bit samples per pixel.
    Rgb24Bpp,
    /// Four 8-bit samples per pixel.
    Rgba32Bpp,
}

impl ColorKind {
    /// Human-readable name used in log messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorKind::Grayscale1Bpp => "gray1",
            ColorKind::Rgb24Bpp => "rgb24",
            ColorKind::Rgba32Bpp => "rgba32",
        }
    }
}

/// A decoded image as handed over by a [`ResourceLookup`](crate::parser::ResourceLookup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Sample layout
    pub kind: ColorKind,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw samples in `kind` layout
    pub samples: Vec<u8>,
}

impl RasterImage {
    /// Create a new raster image.
    pub fn new(kind: ColorKind, width: u32, height: u32, samples: Vec<u8>) -> Self {
        Self {
            kind,
            width,
            height,
            samples,
        }
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expand the samples to 8-bit RGBA.
    ///
    /// Grayscale replicates the channel into R, G and B; RGB inserts an
    /// opaque alpha after every third sample; RGBA is copied through.
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        let pixels = self.pixel_count();
        if pixels == 0 {
            return Err(Error::ImageExtract(format!(
                "empty {} image ({}x{})",
                self.kind.as_str(),
                self.width,
                self.height
            )));
        }

        let expected = match self.kind {
            ColorKind::Grayscale1Bpp => (self.width as usize).div_ceil(8) * self.height as usize,
            ColorKind::Rgb24Bpp => pixels * 3,
            ColorKind::Rgba32Bpp => pixels * 4,
        };
        if self.samples.len() < expected {
            return Err(Error::ImageExtract(format!(
                "{} image {}x{} needs {} bytes, got {}",
                self.kind.as_str(),
                self.width,
                self.height,
                expected,
                self.samples.len()
            )));
        }

        let mut rgba = Vec::with_capacity(pixels * 4);
        match self.kind {
            ColorKind::Grayscale1Bpp => {
                let row_bytes = (self.width as usize).div_ceil(8);
                for row in self.samples.chunks(row_bytes).take(self.height as usize) {
                    for x in 0..self.width as usize {
                        let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
                        let value = if bit == 1 { 255 } else { 0 };
                        rgba.extend_from_slice(&[value, value, value, 255]);
                    }
                }
            }
            ColorKind::Rgb24Bpp => {
                for px in self.samples[..pixels * 3].chunks_exact(3) {
                    rgba.extend_from_slice(px);
                    rgba.push(255);
                }
            }
            ColorKind::Rgba32Bpp => {
                rgba.extend_from_slice(&self.samples[..pixels * 4]);
            }
        }
        Ok(rgba)
    }
}
