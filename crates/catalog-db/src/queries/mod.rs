//! Database query modules.

pub mod categories;
