//! Error taxonomy shared by every presenter.
//!
//! Backend failures are boxed so presenters stay generic over the
//! collaborator implementations. The `Display` text of each variant is the
//! message published in [`Resource::Error`](rollcall_core::Resource::Error).

use rollcall_core::{Resource, account::SubjectId};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The identity provider refused (bad credentials, email in use, …).
  #[error("{0}")]
  Provider(#[source] BoxError),

  /// A document or file operation failed.
  #[error("{0}")]
  Store(#[source] BoxError),

  /// Signed in, but no profile document exists for the subject.
  #[error("User data not found.")]
  NotFound(SubjectId),

  /// Signup attempted while the account collection is non-empty.
  #[error("Only the admin can sign up.")]
  DuplicateNotAllowed,

  #[error("Failed to mark attendance: {0}")]
  WriteFailed(#[source] BoxError),

  #[error("User not logged in.")]
  NotSignedIn,

  #[error("{0}")]
  InvalidInput(String),

  #[error("An unexpected error occurred: {0}")]
  Unexpected(String),
}

impl Error {
  pub(crate) fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn unexpected(e: impl std::fmt::Display) -> Self {
    Self::Unexpected(e.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The published form of an operation's outcome.
pub(crate) fn state_of<T: Clone>(outcome: &Result<T>) -> Resource<T> {
  match outcome {
    Ok(v) => Resource::Success(v.clone()),
    Err(e) => Resource::Error(e.to_string()),
  }
}
