//! Route handlers for the HTTP API.

pub mod categories;
pub mod health;
