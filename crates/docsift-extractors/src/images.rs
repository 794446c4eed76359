//! Image format hints and PNG re-encoding.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, RgbImage};

/// Format hint for an image blob: sniffed from the bytes when the `image`
/// crate recognises them, otherwise `fallback`.
pub(crate) fn format_hint(data: &[u8], fallback: &str) -> String {
    image::guess_format(data)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(fallback)
        .to_string()
}

/// Colour layout of decoded 8-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelLayout {
    Rgb,
    Gray,
}

impl PixelLayout {
    fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Gray => 1,
        }
    }
}

/// Encode raw 8-bit samples as PNG. Returns `None` when the sample count
/// does not match the dimensions.
pub(crate) fn encode_png(
    samples: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
) -> Option<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(layout.channels())?;
    if expected == 0 || samples.len() < expected {
        return None;
    }

    let mut samples = samples;
    samples.truncate(expected);

    let mut out = Cursor::new(Vec::new());
    let written = match layout {
        PixelLayout::Rgb => RgbImage::from_raw(width, height, samples)?
            .write_to(&mut out, ImageFormat::Png),
        PixelLayout::Gray => GrayImage::from_raw(width, height, samples)?
            .write_to(&mut out, ImageFormat::Png),
    };

    match written {
        Ok(()) => Some(out.into_inner()),
        Err(e) => {
            tracing::debug!("PNG re-encoding failed: {}", e);
            None
        }
    }
}
