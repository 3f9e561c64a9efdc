//! Error type for `rollcall-store-sqlite`.

use rollcall_core::document::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollcall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// `update` against a document that does not exist.
  #[error("no document {id} in {collection}")]
  DocumentNotFound { collection: Collection, id: String },

  #[error("the email address is already in use by another account")]
  EmailInUse,

  #[error("the email address is badly formatted")]
  InvalidEmail,

  #[error("password should be at least {0} characters")]
  WeakPassword(usize),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
