//! Route table and the helpers shared by the handlers.
//!
//! | Method | Path | Role |
//! |--------|------|------|
//! | `POST` | `/signup` | none (first account only) |
//! | `GET`  | `/session` | any |
//! | `GET`  | `/qr`, `/qr.svg` | any |
//! | `POST` | `/attendance` | TEACHER, ADMIN |
//! | `GET`  | `/attendance` | any (own records) |
//! | `GET`/`POST` | `/admin/accounts` | ADMIN |
//! | `GET`  | `/admin/directory` | ADMIN |
//! | `POST` | `/admin/accounts/{uid}/roles` | ADMIN |
//! | `DELETE` | `/admin/accounts/{uid}` | ADMIN |
//! | `GET`  | `/assignments` | any |
//! | `GET`/`PUT` | `/assignments/{id}/submission` | any |
//! | `GET`  | `/results` | any |
//! | `GET`  | `/materials`, `/notifications` | any |
//! | `GET`  | `/reports/submissions` | TEACHER, ADMIN |
//! | `GET`  | `/files/{*path}` | any |

pub mod account;
pub mod admin;
pub mod attendance;
pub mod coursework;
pub mod files;
pub mod library;

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::{
  Feed, Resource,
  backend::{DocumentStore, FileStore, IdentityProvider},
};

use crate::{AppState, error::{Error, Result}};

/// Build the API router. Mount it under `/api`.
pub fn api_router<S, I>(state: AppState<S, I>) -> Router<()>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  Router::new()
    // Session
    .route("/signup", post(account::signup::<S, I>))
    .route("/session", get(account::session::<S, I>))
    .route("/qr", get(account::qr_code::<S, I>))
    .route("/qr.svg", get(account::qr_image::<S, I>))
    // Attendance
    .route(
      "/attendance",
      get(attendance::history::<S, I>).post(attendance::mark::<S, I>),
    )
    // Administration
    .route(
      "/admin/accounts",
      get(admin::list::<S, I>).post(admin::create::<S, I>),
    )
    .route("/admin/directory", get(admin::directory::<S, I>))
    .route("/admin/accounts/{uid}", axum::routing::delete(admin::remove::<S, I>))
    .route("/admin/accounts/{uid}/roles", post(admin::add_role::<S, I>))
    // Coursework
    .route("/assignments", get(coursework::assignments::<S, I>))
    .route(
      "/assignments/{id}/submission",
      get(coursework::submission::<S, I>).put(coursework::submit::<S, I>),
    )
    .route("/results", get(coursework::results::<S, I>))
    .route("/reports/submissions", get(coursework::reports::<S, I>))
    // Library
    .route("/materials", get(library::materials::<S, I>))
    .route("/notifications", get(library::notifications::<S, I>))
    // Files
    .route("/files/{*path}", get(files::download::<S, I>))
    .with_state(state)
}

/// Wait for a live feed's first settled value.
pub(crate) async fn settled<T: Clone>(mut feed: Feed<Resource<T>>) -> Result<T> {
  match feed.settled().await {
    Some(Ok(value)) => Ok(value),
    Some(Err(message)) => Err(Error::Snapshot(message)),
    None => Err(Error::Snapshot("live query closed before settling".to_string())),
  }
}
