//! [`ImageResizer`] backed by the `image` crate.

use std::io::Cursor;

use catalog_core::resize::{scaled_height, ImageFormat};
use catalog_core::{Error, ImageResizer, Result};
use image::imageops::FilterType;
use image::DynamicImage;

/// Resizes with a configurable filter (Lanczos3 by default).
#[derive(Debug, Clone, Copy)]
pub struct LanczosResizer {
    filter: FilterType,
}

impl Default for LanczosResizer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl LanczosResizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different resampling filter (e.g. `Triangle` for speed).
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl ImageResizer for LanczosResizer {
    fn render(&self, source: &[u8], format: ImageFormat, widths: &[u32]) -> Result<Vec<Vec<u8>>> {
        let img = image::load_from_memory(source)
            .map_err(|e| Error::image(format!("failed to decode image: {e}")))?;

        let (src_width, src_height) = (img.width(), img.height());

        widths
            .iter()
            .map(|&width| {
                let height = scaled_height(src_width, src_height, width);
                let resized = img.resize_exact(width, height, self.filter);
                encode(resized, format)
            })
            .collect()
    }
}

/// Encode `img` as `format`, converting pixel layouts the encoder cannot take.
fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let img = match format {
        // JPEG has no alpha channel and no 16-bit mode.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        ImageFormat::Png | ImageFormat::Tiff => img,
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| Error::image(format!("failed to encode {format:?}: {e}")))?;
    Ok(buf.into_inner())
}
