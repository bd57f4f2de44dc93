//! Flat-directory storage for derivative sets.
//!
//! A derivative set is one file per configured width, named
//! `{width}_{base_filename}`, all in the same public directory. Sets are
//! written all-or-nothing: every derivative is rendered in memory, staged
//! into temporary files next to their final location, and only then renamed
//! into place. Any failure removes whatever was already written.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use catalog_core::config::{UploadConfig, DEFAULT_MAX_DERIVATIVE_PIXELS};
use catalog_core::resize::scaled_height;
use catalog_core::{Error, ImageResizer, Result};
use image::ImageReader;
use tempfile::NamedTempFile;

use crate::naming::{derivative_name, is_safe_base, new_base_filename, resolve_output};

/// Prefix of in-flight staging files inside the upload directory.
const STAGING_PREFIX: &str = ".staging-";

/// Outcome of removing a derivative set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Files deleted.
    pub removed: usize,
    /// Files that were already absent.
    pub missing: usize,
    /// Files that exist but could not be deleted.
    pub failed: Vec<PathBuf>,
}

impl RemovalReport {
    /// True when nothing was left behind.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Filesystem manager for derivative sets.
#[derive(Debug, Clone)]
pub struct DerivativeStore {
    dir: PathBuf,
    widths: Vec<u32>,
    max_pixels: u64,
}

impl DerivativeStore {
    /// Create a store writing `widths` derivatives into `dir`.
    pub fn new(dir: impl Into<PathBuf>, widths: Vec<u32>) -> Self {
        Self {
            dir: dir.into(),
            widths,
            max_pixels: DEFAULT_MAX_DERIVATIVE_PIXELS,
        }
    }

    /// Create a store from the `uploads` config section.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.dir.clone(), config.effective_widths())
            .with_max_pixels(config.max_derivative_pixels)
    }

    /// Cap the pixel count of any one derivative.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Path of the derivative at `width` for `base_filename`.
    pub fn path(&self, width: u32, base_filename: &str) -> PathBuf {
        self.dir.join(derivative_name(width, base_filename))
    }

    /// Paths of every derivative of `base_filename`, in width order.
    pub fn paths(&self, base_filename: &str) -> Vec<PathBuf> {
        self.widths
            .iter()
            .map(|w| self.path(*w, base_filename))
            .collect()
    }

    /// Whether the complete set for `base_filename` is on disk.
    pub fn exists(&self, base_filename: &str) -> bool {
        is_safe_base(base_filename) && self.paths(base_filename).iter().all(|p| p.is_file())
    }

    /// Render `source` at every width and persist the set under a fresh
    /// base filename, which is returned.
    ///
    /// `original_name` is the client's filename; only its extension is used.
    /// On error no derivative of the new set remains on disk.
    pub fn store(
        &self,
        resizer: &dyn ImageResizer,
        source: &[u8],
        original_name: Option<&str>,
    ) -> Result<String> {
        let output = resolve_output(original_name, source)?;
        let base = new_base_filename(&output.extension);

        self.check_bounds(source)?;
        let rendered = resizer.render(source, output.format, &self.widths)?;
        if rendered.len() != self.widths.len() {
            return Err(Error::Internal(format!(
                "resizer returned {} derivatives for {} widths",
                rendered.len(),
                self.widths.len()
            )));
        }

        std::fs::create_dir_all(&self.dir)?;

        let staged = self.stage(&rendered)?;
        self.commit(staged, &base)?;

        tracing::debug!(
            base = %base,
            format = ?output.format,
            count = self.widths.len(),
            "Stored derivative set"
        );
        Ok(base)
    }

    /// Reject sources whose aspect ratio would make some derivative larger
    /// than `max_pixels`. Only the header is read.
    fn check_bounds(&self, source: &[u8]) -> Result<()> {
        let (src_width, src_height) = ImageReader::new(Cursor::new(source))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| Error::image(format!("failed to read image header: {e}")))?;

        for &width in &self.widths {
            let height = scaled_height(src_width, src_height, width);
            let pixels = u64::from(width) * u64::from(height);
            if pixels > self.max_pixels {
                return Err(Error::image(format!(
                    "a {src_width}x{src_height} image would need a {width}x{height} derivative, \
                     over the {} pixel limit",
                    self.max_pixels
                )));
            }
        }
        Ok(())
    }

    /// Write every rendered derivative to a temporary file in the upload
    /// directory. Dropping the result deletes the temporaries.
    fn stage(&self, rendered: &[Vec<u8>]) -> Result<Vec<NamedTempFile>> {
        rendered
            .iter()
            .map(|bytes| {
                let mut tmp = tempfile::Builder::new()
                    .prefix(STAGING_PREFIX)
                    .tempfile_in(&self.dir)?;
                tmp.write_all(bytes)?;
                tmp.as_file().sync_all()?;
                Ok(tmp)
            })
            .collect()
    }

    /// Rename staged files to their final names, undoing completed renames
    /// if any one fails.
    fn commit(&self, staged: Vec<NamedTempFile>, base: &str) -> Result<()> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());

        for (tmp, width) in staged.into_iter().zip(&self.widths) {
            let target = self.path(*width, base);
            if let Err(e) = tmp.persist_noclobber(&target) {
                tracing::warn!(
                    path = %target.display(),
                    "Failed to persist derivative, rolling back set: {}",
                    e.error
                );
                for path in &written {
                    if let Err(err) = std::fs::remove_file(path) {
                        tracing::warn!(path = %path.display(), "Rollback failed: {err}");
                    }
                }
                return Err(Error::Io { source: e.error });
            }
            written.push(target);
        }

        Ok(())
    }

    /// Delete every derivative of `base_filename`.
    ///
    /// Missing files are expected and only counted. Other failures are
    /// logged and listed in the report; this never returns early.
    pub fn remove(&self, base_filename: &str) -> RemovalReport {
        let mut report = RemovalReport::default();

        if !is_safe_base(base_filename) {
            tracing::warn!(base = %base_filename, "Refusing to remove derivatives for unsafe name");
            return report;
        }

        for path in self.paths(base_filename) {
            match std::fs::remove_file(&path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.missing += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to delete derivative: {e}");
                    report.failed.push(path);
                }
            }
        }

        tracing::debug!(
            base = %base_filename,
            removed = report.removed,
            missing = report.missing,
            failed = report.failed.len(),
            "Removed derivative set"
        );
        report
    }
}
