//! catalog-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, category queries, and the
//! [`SqliteCategoryRepository`] implementation of
//! [`catalog_core::CategoryRepository`].
//!
//! # Example
//!
//! ```
//! use catalog_core::{CategoryRepository, NewCategory};
//! use catalog_db::pool::init_memory_pool;
//! use catalog_db::SqliteCategoryRepository;
//!
//! let repo = SqliteCategoryRepository::new(init_memory_pool().unwrap());
//! let cat = repo
//!     .insert(&NewCategory {
//!         name: "Shoes".into(),
//!         description: "Everything for your feet".into(),
//!         image: "0f3c.png".into(),
//!     })
//!     .unwrap();
//! assert_eq!(repo.list().unwrap().len(), 1);
//! # let _ = cat;
//! ```

pub mod migrations;
pub mod pool;
pub mod queries;
pub mod repository;

pub use repository::SqliteCategoryRepository;
