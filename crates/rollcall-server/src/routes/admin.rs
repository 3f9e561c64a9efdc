//! Handlers for `/admin`. Every route requires ADMIN.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_app::{
  admin::{AccountAdministrator, Directory},
  roles::RoleResolver,
};
use rollcall_core::{
  account::{Account, Role, SubjectId},
  backend::{DocumentStore, FileStore, IdentityProvider},
};
use serde::Deserialize;

use super::settled;
use crate::{
  AppState,
  auth::CurrentSession,
  error::{Error, Result},
};

fn administrator<S, I>(state: AppState<S, I>) -> AccountAdministrator<S, I>
where
  S: DocumentStore,
  I: IdentityProvider,
{
  AccountAdministrator::new(state.store, state.identity)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /admin/accounts`
pub async fn list<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<Vec<Account>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Admin])?;
  let feed = administrator(state).list_accounts().await?;
  Ok(Json(settled(feed).await?))
}

/// `GET /admin/directory`: accounts bucketed into admins, teachers and
/// students.
pub async fn directory<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<Directory>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Admin])?;
  let feed = administrator(state).directory().await?;
  Ok(Json(settled(feed).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

/// `POST /admin/accounts`: body: `{"email":"…","password":"…","role":"STUDENT"}`
pub async fn create<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Admin])?;
  if !body.role.is_selectable() {
    return Err(Error::BadRequest(format!(
      "Role {} cannot be assigned to a new account.",
      body.role
    )));
  }

  let account = administrator(state)
    .create_account(&body.email, &body.password, body.role)
    .await?;
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Roles ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `POST /admin/accounts/{uid}/roles`: body: `{"role":"TEACHER"}`
///
/// Responds with the account as stored after the change.
pub async fn add_role<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Path(uid): Path<String>,
  Json(body): Json<RoleBody>,
) -> Result<Json<Account>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Admin])?;

  let subject = SubjectId::new(uid);
  let resolver = RoleResolver::new(state.store.clone());
  let account = resolver.resolve(&subject).await?;

  administrator(state).add_role(&account, body.role).await?;
  Ok(Json(resolver.resolve(&subject).await?))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /admin/accounts/{uid}`: removes the profile only.
pub async fn remove<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Path(uid): Path<String>,
) -> Result<StatusCode>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Admin])?;
  administrator(state)
    .remove_account(&SubjectId::new(uid))
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
