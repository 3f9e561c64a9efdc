//! Typed live lists on top of [`DocumentStore::subscribe`].

use rollcall_core::{
  Feed, Resource,
  backend::DocumentStore,
  document::{Query, Record, decode_all},
};

use crate::{Error, Result};

/// A live list: a full, decoded snapshot on every change.
pub type ListFeed<T> = Feed<Resource<Vec<T>>>;

/// Subscribe to `query` and decode each snapshot as `R`.
///
/// A snapshot containing a document that does not decode is published as
/// [`Resource::Error`]; the subscription stays open.
pub async fn records<S, R>(store: &S, query: Query) -> Result<ListFeed<R>>
where
  S: DocumentStore,
  R: Record + Clone + Send + Sync + 'static,
{
  let collection = query.collection;
  let snapshots = store.subscribe(query).await.map_err(Error::store)?;

  Ok(snapshots.map(move |snapshot| match snapshot {
    Resource::Loading => Resource::Loading,
    Resource::Success(docs) => match decode_all::<R>(docs) {
      Ok(records) => Resource::Success(records),
      Err(e) => {
        tracing::warn!(%collection, error = %e, "undecodable document in snapshot");
        Resource::Error(e.to_string())
      }
    },
    Resource::Error(message) => Resource::Error(message.clone()),
  }))
}
