//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary upload
//! directory and a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;

use catalog_core::config::Config;
use catalog_core::{Category, CategoryRepository, NewCategory};
use catalog_db::pool::{init_memory_pool, DbPool};
use catalog_server::context::AppContext;
use catalog_server::router::build_router;
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a scratch upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub uploads: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The upload
    /// directory is always replaced by a fresh temp dir.
    pub fn with_config(mut config: Config) -> Self {
        let uploads = tempfile::tempdir().expect("failed to create upload dir");
        config.uploads.dir = uploads.path().to_path_buf();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::with_pool(config, db.clone());

        Self { ctx, db, uploads }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Insert a category directly, bypassing the image pipeline.
    pub fn insert_category(&self, name: &str, image: &str) -> Category {
        self.ctx
            .repo
            .insert(&NewCategory {
                name: name.into(),
                description: format!("About {name}"),
                image: image.into(),
            })
            .expect("failed to insert category")
    }

    /// Sorted file names currently in the upload directory.
    pub fn upload_files(&self) -> Vec<String> {
        list_dir(self.uploads.path())
    }

    /// The file names a derivative set for `image` should consist of.
    pub fn expected_files(&self, image: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .ctx
            .categories
            .store()
            .widths()
            .iter()
            .map(|w| format!("{w}_{image}"))
            .collect();
        names.sort();
        names
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("failed to read dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Encode a solid-colour RGB image of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("failed to encode png");
    buf.into_inner()
}

/// Build a category multipart form; `None` fields are left out.
pub fn category_form(
    name: Option<&str>,
    description: Option<&str>,
    image: Option<(&str, Vec<u8>)>,
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    if let Some(name) = name {
        form = form.text("name", name.to_string());
    }
    if let Some(description) = description {
        form = form.text("description", description.to_string());
    }
    if let Some((file_name, bytes)) = image {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        form = form.part("image", part);
    }
    form
}

/// POST a multipart form and return the response.
pub async fn post_form(url: String, form: reqwest::multipart::Form) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .multipart(form)
        .send()
        .await
        .expect("request failed")
}
