//! Marking attendance from a scanned code, and reading it back.

use std::sync::Arc;

use rollcall_core::{
  Feed, Publisher,
  account::SubjectId,
  attendance::AttendanceEvent,
  backend::DocumentStore,
  document::{Collection, Direction, Query, Record},
};
use serde::Serialize;

use crate::{
  Error, Result, Session,
  live::{ListFeed, records},
  qr,
};

/// Published state of the recorder. Concurrent marks race on it; the last
/// one to finish wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum AttendanceState {
  Idle,
  Recording,
  Recorded(String),
  Failed(String),
}

/// Returned by a successful [`AttendanceRecorder::mark`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceAck {
  pub record_id:  String,
  pub student_id: SubjectId,
  pub message:    String,
}

pub struct AttendanceRecorder<S> {
  store: Arc<S>,
  state: Publisher<AttendanceState>,
}

impl<S: DocumentStore> AttendanceRecorder<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, state: Feed::channel(AttendanceState::Idle).0 }
  }

  /// Append one attendance event for the scanned payload.
  ///
  /// Every call writes a new record, even for a student marked a moment ago.
  pub async fn mark(&self, payload: &str) -> Result<AttendanceAck> {
    self.state.publish(AttendanceState::Recording);

    let outcome = self.append(qr::scanned(payload)).await;
    self.state.publish(match &outcome {
      Ok(ack) => AttendanceState::Recorded(ack.message.clone()),
      Err(e) => AttendanceState::Failed(e.to_string()),
    });
    outcome
  }

  async fn append(&self, student_id: SubjectId) -> Result<AttendanceAck> {
    let event = AttendanceEvent::now(student_id);
    let fields = event.to_fields().map_err(Error::unexpected)?;

    let doc = self
      .store
      .add(Collection::Attendance, fields)
      .await
      .map_err(|e| Error::WriteFailed(Box::new(e)))?;

    tracing::info!(student = %event.student_id, record = %doc.id, "attendance marked");
    Ok(AttendanceAck {
      record_id:  doc.id,
      message:    format!("Attendance marked for student ID: {}", event.student_id),
      student_id: event.student_id,
    })
  }

  pub fn reset(&self) { self.state.publish(AttendanceState::Idle); }

  pub fn state(&self) -> Feed<AttendanceState> { self.state.subscribe() }

  /// The signed-in subject's own attendance, newest first.
  pub async fn history(&self, session: &Session) -> Result<ListFeed<AttendanceEvent>> {
    let query = Query::collection(Collection::Attendance)
      .where_eq("studentId", session.subject_id().as_str())
      .order_by("timestamp", Direction::Descending);
    records(&*self.store, query).await
  }
}
