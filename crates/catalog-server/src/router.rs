//! Axum router construction.
//!
//! Builds the full application router with the category API, middleware
//! layers, the public upload directory and optional SPA file serving.

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Mount point used when the configured public path is unusable.
const DEFAULT_UPLOADS_MOUNT: &str = "/uploads";

/// Normalize `public_path` into a nestable mount point (`/x`, never `/`).
fn uploads_mount(public_path: &str) -> String {
    let trimmed = public_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        tracing::warn!(
            "uploads.public_path '{public_path}' cannot be mounted; using {DEFAULT_UPLOADS_MOUNT}"
        );
        return DEFAULT_UPLOADS_MOUNT.to_string();
    }
    format!("/{trimmed}")
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = &ctx.config.uploads;

    let api = Router::new()
        .route(
            "/category",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/category/{id}",
            get(routes::categories::get_category).delete(routes::categories::delete_category),
        )
        .route(
            "/category/edit/{id}",
            post(routes::categories::update_category),
        )
        .layer(DefaultBodyLimit::max(uploads.max_upload_bytes));

    let mount = uploads_mount(&uploads.public_path);
    tracing::debug!("Serving uploads from {} at {mount}", uploads.dir.display());

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .nest_service(&mount, ServeDir::new(&uploads.dir))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for a prebuilt admin UI.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist; not serving UI", dir);
        }
    }

    app
}
