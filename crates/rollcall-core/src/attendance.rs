//! Attendance events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  account::SubjectId,
  document::{Collection, Record},
};

/// One scan of a student's code. Append-only; nothing prevents two events
/// with the same student and instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
  #[serde(skip)]
  pub id:         String,
  pub student_id: SubjectId,
  pub timestamp:  DateTime<Utc>,
}

impl AttendanceEvent {
  pub fn now(student_id: SubjectId) -> Self {
    Self { id: String::new(), student_id, timestamp: Utc::now() }
  }
}

impl Record for AttendanceEvent {
  const COLLECTION: Collection = Collection::Attendance;

  fn assign_id(&mut self, id: &str) { self.id = id.to_owned(); }
}
