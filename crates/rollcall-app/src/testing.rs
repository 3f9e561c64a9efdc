//! Shared fixtures for presenter tests.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use rollcall_core::{
  account::{Account, Role},
  backend::{DocumentStore, Snapshots},
  document::{Collection, Document, Fields, Query, Record},
};
use rollcall_store_sqlite::{SqliteIdentity, SqliteStore};

pub async fn backend() -> (Arc<SqliteStore>, Arc<SqliteIdentity>) {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let identity = store.identity();
  (Arc::new(store), Arc::new(identity))
}

/// Write a profile document directly, bypassing every presenter.
pub async fn put_profile(store: &SqliteStore, uid: &str, email: &str, roles: &[Role]) -> Account {
  let account = Account::new(uid.into(), email, roles.iter().copied());
  store
    .set(Collection::Users, uid, account.to_fields().unwrap())
    .await
    .unwrap();
  account
}

// ─── Failing store ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FlakyError {
  #[error("disk full")]
  Injected,
  #[error(transparent)]
  Store(#[from] rollcall_store_sqlite::Error),
}

/// A [`SqliteStore`] whose writes (`add`, `set`, `update`) can be made to
/// fail. Reads always go through.
pub struct FlakyStore {
  inner:       SqliteStore,
  fail_writes: AtomicBool,
}

impl FlakyStore {
  pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

  fn check(&self) -> Result<(), FlakyError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      Err(FlakyError::Injected)
    } else {
      Ok(())
    }
  }
}

/// Like [`backend`], but the document store is a [`FlakyStore`] sharing the
/// identity provider's database.
pub async fn flaky_backend() -> (Arc<FlakyStore>, Arc<SqliteIdentity>) {
  let (store, identity) = backend().await;
  let inner = SqliteStore::clone(&store);
  (Arc::new(FlakyStore { inner, fail_writes: AtomicBool::new(false) }), identity)
}

impl DocumentStore for FlakyStore {
  type Error = FlakyError;

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, FlakyError> {
    Ok(self.inner.get(collection, id).await?)
  }

  async fn add(&self, collection: Collection, fields: Fields) -> Result<Document, FlakyError> {
    self.check()?;
    Ok(self.inner.add(collection, fields).await?)
  }

  async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, FlakyError> {
    self.check()?;
    Ok(self.inner.set(collection, id, fields).await?)
  }

  async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, FlakyError> {
    self.check()?;
    Ok(self.inner.update(collection, id, fields).await?)
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<(), FlakyError> {
    Ok(self.inner.delete(collection, id).await?)
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>, FlakyError> {
    Ok(self.inner.query(query).await?)
  }

  async fn subscribe(&self, query: Query) -> Result<Snapshots, FlakyError> {
    Ok(self.inner.subscribe(query).await?)
  }
}
