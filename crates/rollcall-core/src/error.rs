//! Error types for `rollcall-core`.

use thiserror::Error;

use crate::document::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown collection: {0:?}")]
  UnknownCollection(String),

  #[error("document {id} in {collection} is not a JSON object")]
  NotAnObject { collection: Collection, id: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
