//! SQLite backend for Rollcall.
//!
//! One database file backs all three collaborators: the document store and
//! file store ([`SqliteStore`]) and the identity provider
//! ([`SqliteIdentity`]). Wraps [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime.

mod encode;
mod identity;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use identity::SqliteIdentity;
pub use store::{DEFAULT_FILE_BASE_URL, SqliteStore};

#[cfg(test)]
mod tests;
