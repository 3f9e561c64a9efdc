//! Handlers for assignments, submissions, results and reports.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use rollcall_app::coursework::{Coursework, Upload};
use rollcall_core::{
  account::Role,
  backend::{DocumentStore, FileStore, IdentityProvider},
  coursework::{Assignment, GradeResult, Submission},
};
use serde::Deserialize;

use super::settled;
use crate::{AppState, auth::CurrentSession, error::Result};

/// `GET /assignments`: latest due date first.
pub async fn assignments<S, I>(
  State(state): State<AppState<S, I>>,
  _session: CurrentSession,
) -> Result<Json<Vec<Assignment>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let feed = Coursework::new(state.store).assignments().await?;
  Ok(Json(settled(feed).await?))
}

/// `GET /assignments/{id}/submission`: the caller's submission, or `null`.
pub async fn submission<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Path(id): Path<String>,
) -> Result<Json<Option<Submission>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let feed = Coursework::new(state.store)
    .submission_for(&id, session.subject_id())
    .await?;
  Ok(Json(settled(feed).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
  pub file_name:    Option<String>,
  pub student_name: Option<String>,
}

/// `PUT /assignments/{id}/submission[?fileName=…&studentName=…]`: the body
/// is the file content.
pub async fn submit<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
  Path(id): Path<String>,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let upload = Upload {
    file_name:    params.file_name,
    student_name: params.student_name,
    bytes:        body,
  };
  let submission = Coursework::new(state.store)
    .submit(&session, &id, upload)
    .await?;
  Ok((StatusCode::CREATED, Json(submission)))
}

/// `GET /results`: the caller's graded submissions.
pub async fn results<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<Vec<GradeResult>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  let feed = Coursework::new(state.store).results(&session).await?;
  Ok(Json(settled(feed).await?))
}

/// `GET /reports/submissions`: every submission, for staff.
pub async fn reports<S, I>(
  State(state): State<AppState<S, I>>,
  session: CurrentSession,
) -> Result<Json<Vec<Submission>>>
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  session.require_any(&[Role::Teacher, Role::Admin])?;
  let feed = Coursework::new(state.store).all_submissions().await?;
  Ok(Json(settled(feed).await?))
}
