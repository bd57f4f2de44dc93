//! Image derivative pipeline.
//!
//! Turns one uploaded picture into a set of width-fixed, aspect-preserving
//! copies stored side by side in the public upload directory, and removes
//! such sets again when the owning record changes or goes away.

pub mod naming;
mod resizer;
mod store;

pub use resizer::LanczosResizer;
pub use store::{DerivativeStore, RemovalReport};
