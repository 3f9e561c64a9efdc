//! Role resolution: from an authenticated subject to its profile and
//! landing destination.

use std::sync::Arc;

use rollcall_core::{
  account::{Account, Destination, SubjectId},
  backend::DocumentStore,
  document::{Collection, Document},
};

use crate::{Error, Result};

/// Reads `users/{subject}` to find what a subject is allowed to see.
pub struct RoleResolver<S> {
  store: Arc<S>,
}

impl<S> Clone for RoleResolver<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: DocumentStore> RoleResolver<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Load the subject's profile. A missing document is [`Error::NotFound`],
  /// even though the subject may hold a perfectly valid provider session.
  /// A profile with no roles resolves successfully.
  pub async fn resolve(&self, subject: &SubjectId) -> Result<Account> {
    let doc = self
      .store
      .get(Collection::Users, subject.as_str())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(subject.clone()))?;

    decode_account(&doc)
  }

  /// Resolve and pick the landing destination by role priority.
  pub async fn route(&self, subject: &SubjectId) -> Result<Destination> {
    let account = self.resolve(subject).await?;
    let destination = account.destination();
    tracing::debug!(%subject, ?destination, "routed");
    Ok(destination)
  }
}

pub(crate) fn decode_account(doc: &Document) -> Result<Account> {
  doc.decode::<Account>().map_err(Error::unexpected)
}
