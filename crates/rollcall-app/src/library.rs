//! Read-only feeds: course materials and notifications.

use std::sync::Arc;

use rollcall_core::{
  backend::DocumentStore,
  coursework::{CourseMaterial, Notification},
  document::{Collection, Direction, Query},
};

use crate::{
  Result,
  live::{ListFeed, records},
};

pub struct Library<S> {
  store: Arc<S>,
}

impl<S: DocumentStore> Library<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Newest upload first.
  pub async fn materials(&self) -> Result<ListFeed<CourseMaterial>> {
    let query =
      Query::collection(Collection::CourseMaterials).order_by("uploadedAt", Direction::Descending);
    records(&*self.store, query).await
  }

  /// Newest first.
  pub async fn notifications(&self) -> Result<ListFeed<Notification>> {
    let query =
      Query::collection(Collection::Notifications).order_by("timestamp", Direction::Descending);
    records(&*self.store, query).await
  }
}
