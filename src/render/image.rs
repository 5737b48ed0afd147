//! PNG encoding for extracted images.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgba};

use crate::error::{Error, Result};

/// Encode an RGBA8 buffer as PNG bytes.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
            Error::ImageExtract(format!(
                "RGBA buffer of {} bytes does not fit {}x{}",
                rgba.len(),
                width,
                height
            ))
        })?;

    let mut bytes = Cursor::new(Vec::new());
    buffer.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// File name for an image painted on `page` from resource `resource`.
///
/// `index` disambiguates repeated paints of the same resource.
pub fn image_file_name(stem: &str, page: u32, resource: &str, index: usize) -> String {
    let resource: String = resource
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}-p{}-{}-{}.png", stem, page, resource, index)
}
