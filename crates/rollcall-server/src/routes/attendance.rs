//! Handlers for `/attendance`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_app::attendance::AttendanceRecorder;
use rollcall_core::{
  account::Role,
  attendance::AttendanceEvent,
  backend::{DocumentStore, FileStore, IdentityProvider},
};
use serde::Deserialize;

use super::settled;
use crate::{AppState, auth::CurrentSession, error::Result};

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  /// The scanned QR payload, taken as the student's subject id.
  pub payload: String,
}

/// `POST /attendance`: body: `{"payload":"<subject id>"}`
pub async fn mark<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Json(body): Json<ScanBody>,
) -> Result<impl IntoResponse>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Teacher, Role::Admin])?;

  let recorder = AttendanceRecorder::new(state.store);
  let ack = recorder.mark(&body.payload).await?;
  Ok((StatusCode::CREATED, Json(ack)))
}

/// `GET /attendance`: the caller's own attendance, newest first.
pub async fn history<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<Vec<AttendanceEvent>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let recorder = AttendanceRecorder::new(state.store);
  let feed = recorder.history(&session).await?;
  Ok(Json(settled(feed).await?))
}
