//! Application context shared by all route handlers via Axum state.

use std::sync::Arc;

use catalog_core::config::Config;
use catalog_core::{CategoryRepository, ImageResizer};
use catalog_db::pool::DbPool;
use catalog_db::SqliteCategoryRepository;
use catalog_images::{DerivativeStore, LanczosResizer};

use crate::service::CategoryService;

/// Cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Record store; also reachable through `categories`.
    pub repo: Arc<dyn CategoryRepository>,
    /// Category operations with derivative bookkeeping.
    pub categories: CategoryService,
}

impl AppContext {
    /// Wire the given capabilities together.
    pub fn new(
        config: Config,
        repo: Arc<dyn CategoryRepository>,
        resizer: Arc<dyn ImageResizer>,
    ) -> Self {
        let store = Arc::new(DerivativeStore::from_config(&config.uploads));
        let categories = CategoryService::new(repo.clone(), resizer, store);
        Self {
            config: Arc::new(config),
            repo,
            categories,
        }
    }

    /// Production wiring: SQLite records and the Lanczos resizer.
    pub fn with_pool(config: Config, db: DbPool) -> Self {
        Self::new(
            config,
            Arc::new(SqliteCategoryRepository::new(db)),
            Arc::new(LanczosResizer::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_db::pool::init_memory_pool;

    #[test]
    fn store_follows_upload_config() {
        let mut config = Config::default();
        config.uploads.widths = vec![64, 0, 64, 128];
        let ctx = AppContext::with_pool(config, init_memory_pool().unwrap());
        assert_eq!(ctx.categories.store().widths(), &[64, 128]);
        assert!(ctx.repo.list().unwrap().is_empty());
    }
}
