//! catalog-server: HTTP API for categories and their image derivatives.
//!
//! This crate ties the other catalog-* crates into a running server:
//!
//! - Axum-based JSON/multipart API under `/api/category`
//! - [`service::CategoryService`], which keeps records and derivative files
//!   consistent
//! - Static serving of the upload directory and an optional admin UI
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod form;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod service;

use std::net::SocketAddr;

use catalog_core::config::Config;

use crate::context::AppContext;

/// Start the catalog server.
///
/// Initializes the database and the upload directory, constructs the
/// [`AppContext`], and serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> catalog_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = catalog_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    std::fs::create_dir_all(&config.uploads.dir)?;
    tracing::info!(
        "Upload directory {} (widths {:?})",
        config.uploads.dir.display(),
        config.uploads.effective_widths()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| catalog_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::with_pool(config, db);
    let app = router::build_router(ctx, static_dir);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| catalog_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
