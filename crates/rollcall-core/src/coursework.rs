//! Assignments, submissions, results, course materials and notifications.
//!
//! These collections are written elsewhere (by staff tooling) and read here;
//! the one exception is [`Submission`], which students add when uploading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  account::SubjectId,
  document::{Collection, Record},
};

// ─── Assignment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  #[serde(skip)]
  pub id:          String,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub due_date:    Option<DateTime<Utc>>,
}

impl Record for Assignment {
  const COLLECTION: Collection = Collection::Assignments;

  fn assign_id(&mut self, id: &str) { self.id = id.to_owned(); }
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
  #[default]
  Submitted,
  Graded,
}

/// A student's upload for an assignment. The store may hold several per
/// (assignment, student) pair; readers take the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  #[serde(skip)]
  pub id:            String,
  pub assignment_id: String,
  pub student_id:    SubjectId,
  #[serde(default)]
  pub student_name:  String,
  #[serde(default)]
  pub file_url:      String,
  pub file_name:     Option<String>,
  pub submitted_at:  Option<DateTime<Utc>>,
  #[serde(default)]
  pub status:        SubmissionStatus,
  pub grade:         Option<String>,
  pub feedback:      Option<String>,
}

impl Submission {
  pub fn is_graded(&self) -> bool { self.grade.is_some() }
}

impl Record for Submission {
  const COLLECTION: Collection = Collection::Submissions;

  fn assign_id(&mut self, id: &str) { self.id = id.to_owned(); }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// A graded submission joined with its assignment's title. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
  pub id:         String,
  pub student_id: SubjectId,
  /// The assignment title, or `"Unknown Subject"` if it could not be found.
  pub subject:    String,
  pub grade:      String,
  pub date:       DateTime<Utc>,
}

impl GradeResult {
  pub const UNKNOWN_SUBJECT: &'static str = "Unknown Subject";
}

// ─── Course material ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMaterial {
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub file_name:   String,
  #[serde(default)]
  pub url:         String,
  pub uploaded_at: Option<DateTime<Utc>>,
}

impl Record for CourseMaterial {
  const COLLECTION: Collection = Collection::CourseMaterials;
}

// ─── Notification ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  #[serde(default)]
  pub title:     String,
  #[serde(default)]
  pub message:   String,
  /// Stored as epoch milliseconds.
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

impl Record for Notification {
  const COLLECTION: Collection = Collection::Notifications;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::document::{Document, Fields};

  fn fields(v: serde_json::Value) -> Fields {
    match v {
      serde_json::Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  #[test]
  fn submission_decodes_with_document_id() {
    let doc = Document {
      collection: Collection::Submissions,
      id:         "sub-1".into(),
      fields:     fields(json!({
        "assignmentId": "a1",
        "studentId": "s1",
        "studentName": "Ada",
        "fileUrl": "/files/assignments/a1/essay.pdf",
        "fileName": "essay.pdf",
        "submittedAt": "2024-03-01T10:00:00Z",
        "status": "Graded",
        "grade": "A",
      })),
    };
    let sub: Submission = doc.decode().unwrap();
    assert_eq!(sub.id, "sub-1");
    assert_eq!(sub.status, SubmissionStatus::Graded);
    assert!(sub.is_graded());
    assert_eq!(sub.feedback, None);
  }

  #[test]
  fn notification_timestamp_is_epoch_millis() {
    let n: Notification = serde_json::from_value(json!({
      "title": "Exam",
      "message": "Room 4",
      "timestamp": 1_700_000_000_000_i64,
    }))
    .unwrap();
    assert_eq!(n.timestamp.timestamp_millis(), 1_700_000_000_000);
  }
}
