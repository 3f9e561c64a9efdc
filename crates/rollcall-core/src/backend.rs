//! The three external collaborators: identity provider, document store and
//! file store.
//!
//! The traits are implemented by backends (e.g. `rollcall-store-sqlite`).
//! Presenters in `rollcall-app` depend on these abstractions only.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use bytes::Bytes;

use crate::{
  account::SubjectId,
  document::{Collection, Document, Fields, Query},
  feed::{Feed, Resource},
};

/// A live query: a fresh full snapshot is published on every change to the
/// queried collection.
pub type Snapshots = Feed<Resource<Vec<Document>>>;

// ─── Identity provider ───────────────────────────────────────────────────────

/// Issues opaque subject ids for email/password credentials.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Verify credentials and open a provider session for the subject.
  fn sign_in<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<SubjectId, Self::Error>> + Send + 'a;

  /// Create a credential. Fails if the email is already registered. Does not
  /// open a session.
  fn sign_up<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<SubjectId, Self::Error>> + Send + 'a;

  /// Close the subject's provider session, if any.
  fn sign_out<'a>(
    &'a self,
    subject: &'a SubjectId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Whether the provider still considers the subject signed in. Independent
  /// of whether a profile document exists.
  fn has_session<'a>(
    &'a self,
    subject: &'a SubjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Document store ──────────────────────────────────────────────────────────

/// A schemaless, collection-keyed document database.
///
/// No operation is transactional across calls; concurrent writers are
/// last-write-wins.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Point read. Returns `None` if the document does not exist.
  fn get<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Insert under a freshly generated id.
  fn add(
    &self,
    collection: Collection,
    fields: Fields,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Create or fully replace the document at `id`.
  fn set<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    fields: Fields,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  /// Merge `fields` into an existing document. Fails if it does not exist.
  fn update<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    fields: Fields,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  /// Delete the document at `id`. Deleting a missing document succeeds.
  fn delete<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// One-shot query.
  fn query<'a>(
    &'a self,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Live query. The first snapshot may still be [`Resource::Loading`]; a
  /// failed re-run publishes [`Resource::Error`] and the subscription keeps
  /// listening. Dropping every reader ends the subscription.
  fn subscribe(
    &self,
    query: Query,
  ) -> impl Future<Output = Result<Snapshots, Self::Error>> + Send + '_;
}

// ─── File store ──────────────────────────────────────────────────────────────

/// Blob storage addressed by slash-separated paths.
pub trait FileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `bytes` at `path`, replacing anything already there, and return a
  /// download URL for it.
  fn put_file<'a>(
    &'a self,
    path: &'a str,
    bytes: Bytes,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Read back a stored file. Returns `None` if nothing is stored at `path`.
  fn get_file<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Option<Bytes>, Self::Error>> + Send + 'a;
}
