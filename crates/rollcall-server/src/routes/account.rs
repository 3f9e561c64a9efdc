//! Handlers for signup, the current session and the personal QR payload.

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use rollcall_app::{Session, auth::Auth, qr::{self, QrPayload}};
use rollcall_core::backend::{DocumentStore, FileStore, IdentityProvider};
use serde::Deserialize;

use crate::{AppState, auth::CurrentSession, error::Result};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// `POST /signup`: body: `{"email":"…","password":"…"}`
///
/// Creates the first administrator. 409 once any account exists.
pub async fn signup<S, I>(
  State(state): State<AppState<S, I>>,
  Json(body): Json<Credentials>,
) -> Result<impl IntoResponse>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let auth = Auth::new(state.store, state.identity);
  let account = auth.create_first_admin(&body.email, &body.password).await?;
  Ok((StatusCode::CREATED, Json(account)))
}

/// `GET /session`: the caller's account and landing destination.
pub async fn session<S, I>(
  State(_state): State<AppState<S, I>>,
  CurrentSession(session): CurrentSession,
) -> Json<Session>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  Json(session)
}

/// `GET /qr`
pub async fn qr_code<S, I>(
  State(_state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<QrPayload>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  Ok(Json(qr::payload_for(Some(&session.0))?))
}

/// `GET /qr.svg`: the caller's personal code as an SVG image.
pub async fn qr_image<S, I>(
  State(_state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<impl IntoResponse>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let svg = qr::payload_for(Some(&session.0))?.to_svg()?;
  Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
