//! catalog-core: shared types, IDs, errors, configuration and capabilities.
//!
//! This crate is the foundational dependency for all other catalog-* crates,
//! providing type-safe identifiers, a unified error type, the category
//! model, application configuration, and the `CategoryRepository` and
//! `ImageResizer` capability traits that the server injects.

pub mod category;
pub mod config;
pub mod error;
pub mod ids;
pub mod resize;
pub mod validation;

// Re-export the most commonly used items at the crate root.
pub use category::{Category, CategoryChanges, CategoryRepository, NewCategory, UpdatedCategory};
pub use error::{Error, Result};
pub use ids::*;
pub use resize::ImageResizer;
pub use validation::FieldErrors;
