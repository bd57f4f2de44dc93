//! Base filename generation and derivative naming.
//!
//! A base filename is a fresh UUID plus the upload's extension. Every
//! derivative of it is stored as `{width}_{base}`.

use std::path::Path;

use catalog_core::resize::ImageFormat;
use catalog_core::{Error, Result};
use uuid::Uuid;

/// Output formats the pipeline knows how to encode.
const WRITABLE_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Longest extension accepted from a client filename.
const MAX_EXTENSION_LEN: usize = 10;

/// Extension and encoding chosen for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub extension: String,
    pub format: ImageFormat,
}

/// Lower-cased extension of a client filename, if it is plain ASCII
/// alphanumerics.
pub fn client_extension(original_name: Option<&str>) -> Option<String> {
    let ext = Path::new(original_name?).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Decide the extension and encoding for `source`.
///
/// The client's extension wins when it names a writable format. Otherwise
/// the format sniffed from the bytes is used, with its canonical extension.
/// Bytes that are not a recognizable image are rejected.
pub fn resolve_output(original_name: Option<&str>, source: &[u8]) -> Result<OutputSpec> {
    let detected = image::guess_format(source)
        .map_err(|e| Error::image(format!("unrecognized image data: {e}")))?;

    if let Some(ext) = client_extension(original_name) {
        if let Some(format) = ImageFormat::from_extension(&ext).filter(is_writable) {
            return Ok(OutputSpec {
                extension: ext,
                format,
            });
        }
    }

    if !is_writable(&detected) {
        return Err(Error::image(format!(
            "unsupported image format: {detected:?}"
        )));
    }

    let extension = detected
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| Error::image(format!("no extension known for {detected:?}")))?;

    Ok(OutputSpec {
        extension: extension.to_string(),
        format: detected,
    })
}

fn is_writable(format: &ImageFormat) -> bool {
    WRITABLE_FORMATS.contains(format)
}

/// Generate a collision-resistant base filename with `extension`.
pub fn new_base_filename(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), extension)
}

/// File name of the derivative at `width`.
pub fn derivative_name(width: u32, base_filename: &str) -> String {
    format!("{width}_{base_filename}")
}

/// Whether `base_filename` is a single, plain path component.
///
/// Stored names come from [`new_base_filename`]; anything else is refused
/// before it reaches the filesystem.
pub fn is_safe_base(base_filename: &str) -> bool {
    !base_filename.is_empty()
        && base_filename != "."
        && !base_filename.contains("..")
        && !base_filename.contains(&['/', '\\', '\0'][..])
}
