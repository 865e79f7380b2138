//! SQLite backend for Betterpedia comments and badges.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call is a closure executed on
//! that one connection, so a read-modify-write inside a single call is atomic
//! with respect to every other caller.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
