//! Image resizing capability.

pub use image::ImageFormat;

use crate::Result;

/// Turns one source image into encoded, width-fixed derivatives.
pub trait ImageResizer: Send + Sync {
    /// Decode `source`, then resize it to each of `widths` (height scaled to
    /// keep the aspect ratio) and encode each result as `format`.
    ///
    /// The output has one entry per width, in the same order. Any decode or
    /// encode failure aborts the whole call with [`Error::Image`](crate::Error::Image).
    fn render(&self, source: &[u8], format: ImageFormat, widths: &[u32]) -> Result<Vec<Vec<u8>>>;
}

/// Height that keeps the `src_width:src_height` ratio at `width`.
///
/// Rounded to the nearest pixel and never below 1.
pub fn scaled_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 {
        return 1;
    }
    let h = (u64::from(src_height) * u64::from(width) * 2 + u64::from(src_width))
        / (u64::from(src_width) * 2);
    u32::try_from(h).unwrap_or(u32::MAX).max(1)
}
