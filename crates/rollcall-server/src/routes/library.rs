//! Handlers for course materials and notifications.

use axum::{Json, extract::State};
use rollcall_app::library::Library;
use rollcall_core::{
  backend::{DocumentStore, FileStore, IdentityProvider},
  coursework::{CourseMaterial, Notification},
};

use super::settled;
use crate::{AppState, auth::CurrentSession, error::Result};

/// `GET /materials`
pub async fn materials<S, I>(
  State(state): State<AppState<S, I>>,
  _session: CurrentSession,
) -> Result<Json<Vec<CourseMaterial>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let feed = Library::new(state.store).materials().await?;
  Ok(Json(settled(feed).await?))
}

/// `GET /notifications`
pub async fn notifications<S, I>(
  State(state): State<AppState<S, I>>,
  _session: CurrentSession,
) -> Result<Json<Vec<Notification>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let feed = Library::new(state.store).notifications().await?;
  Ok(Json(settled(feed).await?))
}
