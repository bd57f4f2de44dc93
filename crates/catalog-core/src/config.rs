//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server and upload sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Widths (in pixels) of the derivatives generated for every uploaded image.
pub const DEFAULT_WIDTHS: [u32; 5] = [50, 150, 300, 600, 1200];

/// Default cap on the pixel count of a single derivative.
pub const DEFAULT_MAX_DERIVATIVE_PIXELS: u64 = 40_000_000;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path.
    ///
    /// A missing path or a file that does not exist yields the defaults; a
    /// file that exists but cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io { source: e }),
        }
    }

    /// Load configuration, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {e}; using defaults");
            Self::default()
        })
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.uploads.widths.is_empty() {
            warnings.push(format!(
                "uploads.widths is empty; falling back to {DEFAULT_WIDTHS:?}"
            ));
        }
        if self.uploads.widths.contains(&0) {
            warnings.push("uploads.widths contains 0; zero widths are ignored".into());
        }
        let mut seen = HashSet::new();
        for w in &self.uploads.widths {
            if !seen.insert(w) {
                warnings.push(format!("uploads.widths lists {w} more than once"));
            }
        }

        if !self.uploads.public_path.starts_with('/') {
            warnings.push(format!(
                "uploads.public_path '{}' should start with '/'",
                self.uploads.public_path
            ));
        }

        if self.uploads.max_upload_bytes == 0 {
            warnings.push("uploads.max_upload_bytes is 0; every upload will be rejected".into());
        }
        if self.uploads.max_derivative_pixels == 0 {
            warnings.push(
                "uploads.max_derivative_pixels is 0; every upload will be rejected".into(),
            );
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding a prebuilt admin UI, served as an SPA fallback.
    pub static_dir: Option<PathBuf>,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            static_dir: None,
            db_path: PathBuf::from("./catalog.db"),
        }
    }
}

/// Image upload and derivative storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Flat directory holding every derivative file.
    pub dir: PathBuf,
    /// URL prefix under which `dir` is served.
    pub public_path: String,
    /// Target widths; one derivative is written per entry.
    pub widths: Vec<u32>,
    /// Upper bound on a request body carrying an upload.
    pub max_upload_bytes: usize,
    /// Upper bound on `width * height` of any single derivative. Uploads
    /// whose aspect ratio would exceed it at some width are rejected.
    pub max_derivative_pixels: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./public/uploads"),
            public_path: "/uploads".into(),
            widths: DEFAULT_WIDTHS.to_vec(),
            max_upload_bytes: 10 * 1024 * 1024,
            max_derivative_pixels: DEFAULT_MAX_DERIVATIVE_PIXELS,
        }
    }
}

impl UploadConfig {
    /// The widths actually used: deduplicated, zero-free, in configured order,
    /// or [`DEFAULT_WIDTHS`] when nothing usable is configured.
    pub fn effective_widths(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let widths: Vec<u32> = self
            .widths
            .iter()
            .copied()
            .filter(|w| *w > 0 && seen.insert(*w))
            .collect();
        if widths.is_empty() {
            DEFAULT_WIDTHS.to_vec()
        } else {
            widths
        }
    }

    /// Public URL of the derivative at `width` for `base_filename`.
    pub fn public_url(&self, width: u32, base_filename: &str) -> String {
        format!(
            "{}/{}_{}",
            self.public_path.trim_end_matches('/'),
            width,
            base_filename
        )
    }
}
