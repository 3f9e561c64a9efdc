//! `GET /files/{*path}`: serve bytes stored through the file store.

use axum::{
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use rollcall_core::backend::{DocumentStore, FileStore, IdentityProvider};

use crate::{
  AppState,
  auth::CurrentSession,
  error::{Error, Result},
};

pub async fn download<S, I>(
  State(state): State<AppState<S, I>>,
  _session: CurrentSession,
  Path(path): Path<String>,
) -> Result<Response>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let bytes = state
    .store
    .get_file(&path)
    .await
    .map_err(|e| rollcall_app::Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::NotFound(format!("No file at {path}.")))?;

  Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}
