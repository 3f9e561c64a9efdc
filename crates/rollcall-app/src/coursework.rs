//! Assignments, submissions and the results derived from them.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use rollcall_core::{
  Feed, Publisher, Resource,
  account::SubjectId,
  backend::{DocumentStore, FileStore},
  coursework::{Assignment, GradeResult, Submission, SubmissionStatus},
  document::{Collection, Direction, Query, Record},
};

use crate::{
  Error, Result, Session,
  auth::OpState,
  error::state_of,
  live::{ListFeed, records},
};

/// Stored as the submitter's name when no display name is known.
pub const ANONYMOUS_STUDENT: &str = "Anonymous Student";

/// A file to upload as a submission.
#[derive(Debug, Clone)]
pub struct Upload {
  /// Generated from the clock when absent.
  pub file_name:    Option<String>,
  pub student_name: Option<String>,
  pub bytes:        Bytes,
}

pub struct Coursework<S> {
  store:  Arc<S>,
  upload: Publisher<OpState<Submission>>,
}

impl<S: DocumentStore> Coursework<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, upload: Feed::channel(None).0 }
  }

  /// Every assignment, latest due date first.
  pub async fn assignments(&self) -> Result<ListFeed<Assignment>> {
    let query =
      Query::collection(Collection::Assignments).order_by("dueDate", Direction::Descending);
    records(&*self.store, query).await
  }

  /// The student's submission for one assignment, if any. When several
  /// exist the first one stored wins.
  pub async fn submission_for(
    &self,
    assignment_id: &str,
    student_id: &SubjectId,
  ) -> Result<Feed<Resource<Option<Submission>>>> {
    let query = Query::collection(Collection::Submissions)
      .where_eq("assignmentId", assignment_id)
      .where_eq("studentId", student_id.as_str());
    let matches = records::<S, Submission>(&*self.store, query).await?;
    Ok(matches.map(|snapshot| snapshot.clone().map(|subs| subs.into_iter().next())))
  }

  /// Every submission from every student, for staff reports.
  pub async fn all_submissions(&self) -> Result<ListFeed<Submission>> {
    records(&*self.store, Query::collection(Collection::Submissions)).await
  }

  pub fn upload_state(&self) -> Feed<OpState<Submission>> { self.upload.subscribe() }
}

impl<S: DocumentStore + 'static> Coursework<S> {
  /// The signed-in student's graded submissions joined with assignment
  /// titles, newest first.
  ///
  /// Titles are looked up again on every change to the student's
  /// submissions, not when an assignment is renamed.
  pub async fn results(&self, session: &Session) -> Result<ListFeed<GradeResult>> {
    let query = Query::collection(Collection::Submissions)
      .where_eq("studentId", session.subject_id().as_str())
      .order_by("submittedAt", Direction::Descending);
    let mut submissions = records::<S, Submission>(&*self.store, query).await?;

    let (publisher, feed) = Feed::channel(Resource::Loading);
    let store = self.store.clone();
    tokio::spawn(async move {
      let mut snapshot = submissions.current();
      loop {
        let joined = match snapshot {
          Resource::Loading => Resource::Loading,
          Resource::Error(message) => Resource::Error(message),
          Resource::Success(subs) => join_titles(&*store, subs).await.into(),
        };
        publisher.publish(joined);

        tokio::select! {
          _ = publisher.closed() => break,
          next = submissions.changed() => match next {
            Some(next) => snapshot = next,
            None => break,
          },
        }
      }
    });

    Ok(feed)
  }
}

impl<S: DocumentStore + FileStore> Coursework<S> {
  /// Upload a file to `assignments/{assignment}/{file}` and record a
  /// submission pointing at it.
  pub async fn submit(
    &self,
    session: &Session,
    assignment_id: &str,
    upload: Upload,
  ) -> Result<Submission> {
    self.upload.publish(Some(Resource::Loading));
    let outcome = self.store_submission(session, assignment_id, upload).await;
    self.upload.publish(Some(state_of(&outcome)));
    outcome
  }

  async fn store_submission(
    &self,
    session: &Session,
    assignment_id: &str,
    upload: Upload,
  ) -> Result<Submission> {
    check_path_segment("assignment id", assignment_id)?;
    let file_name = match upload.file_name {
      Some(name) => {
        check_path_segment("file name", &name)?;
        name
      }
      None => format!("assignment_{}", Utc::now().timestamp_millis()),
    };

    let path = format!("assignments/{assignment_id}/{file_name}");
    let file_url = self
      .store
      .put_file(&path, upload.bytes)
      .await
      .map_err(Error::store)?;

    let mut submission = Submission {
      id: String::new(),
      assignment_id: assignment_id.to_owned(),
      student_id: session.subject_id().clone(),
      student_name: upload
        .student_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS_STUDENT.to_owned()),
      file_url,
      file_name: Some(file_name),
      submitted_at: Some(Utc::now()),
      status: SubmissionStatus::Submitted,
      grade: None,
      feedback: None,
    };
    let fields = submission.to_fields().map_err(Error::unexpected)?;
    let doc = self
      .store
      .add(Collection::Submissions, fields)
      .await
      .map_err(Error::store)?;
    submission.assign_id(&doc.id);

    tracing::info!(
      student = %submission.student_id,
      assignment = %submission.assignment_id,
      submission = %submission.id,
      "assignment submitted"
    );
    Ok(submission)
  }
}

/// A single path segment: non-empty, no separators, not `.` or `..`.
fn check_path_segment(what: &str, segment: &str) -> Result<()> {
  let bad = segment.trim().is_empty()
    || segment.contains(['/', '\\'])
    || segment == "."
    || segment == "..";
  if bad {
    return Err(Error::InvalidInput(format!("Invalid {what}: {segment:?}")));
  }
  Ok(())
}

async fn join_titles<S: DocumentStore>(
  store: &S,
  submissions: Vec<Submission>,
) -> Result<Vec<GradeResult>> {
  let mut results = Vec::new();
  for submission in submissions {
    let Some(grade) = submission.grade else {
      continue;
    };

    let assignment = store
      .get(Collection::Assignments, &submission.assignment_id)
      .await
      .map_err(Error::store)?;
    let subject = assignment
      .and_then(|doc| doc.decode::<Assignment>().ok())
      .map(|a| a.title)
      .unwrap_or_else(|| GradeResult::UNKNOWN_SUBJECT.to_owned());

    results.push(GradeResult {
      id: submission.id,
      student_id: submission.student_id,
      subject,
      grade,
      date: submission.submitted_at.unwrap_or_else(Utc::now),
    });
  }
  Ok(results)
}

#[cfg(test)]
mod tests {
  use rollcall_core::{
    account::{Account, Role},
    backend::FileStore,
  };
  use serde_json::json;

  use super::*;
  use crate::testing::backend;

  fn student(uid: &str) -> Session {
    Session::new(Account::new(uid.into(), format!("{uid}@x.com"), [Role::Student]))
  }

  fn upload(name: Option<&str>, bytes: &'static [u8]) -> Upload {
    Upload {
      file_name:    name.map(str::to_owned),
      student_name: None,
      bytes:        Bytes::from_static(bytes),
    }
  }

  async fn put(store: &impl DocumentStore, collection: Collection, id: &str, value: serde_json::Value) {
    let serde_json::Value::Object(fields) = value else { panic!("not an object") };
    store.set(collection, id, fields).await.unwrap();
  }

  #[tokio::test]
  async fn assignments_are_ordered_by_due_date_descending() {
    let (store, _) = backend().await;
    put(&*store, Collection::Assignments, "a1", json!({"title": "Early", "dueDate": "2024-03-01T00:00:00Z"})).await;
    put(&*store, Collection::Assignments, "a2", json!({"title": "Late", "dueDate": "2024-05-01T00:00:00Z"})).await;

    let coursework = Coursework::new(store);
    let mut feed = coursework.assignments().await.unwrap();
    let list = feed.settled().await.unwrap().unwrap();
    let titles: Vec<_> = list.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Late", "Early"]);
    assert_eq!(list[0].id, "a2");
  }

  #[tokio::test]
  async fn submit_uploads_and_records() {
    let (store, _) = backend().await;
    let coursework = Coursework::new(store.clone());
    let me = student("s1");

    let mut mine = coursework.submission_for("a1", me.subject_id()).await.unwrap();
    assert_eq!(mine.settled().await, Some(Ok(None)));

    let submission = coursework
      .submit(&me, "a1", upload(Some("essay.txt"), b"my essay"))
      .await
      .unwrap();
    assert_eq!(submission.student_name, ANONYMOUS_STUDENT);
    assert_eq!(submission.status, SubmissionStatus::Submitted);
    assert!(submission.file_url.contains("assignments/a1/essay.txt"));
    assert_eq!(
      &store.get_file("assignments/a1/essay.txt").await.unwrap().unwrap()[..],
      b"my essay"
    );

    let found = mine
      .wait_for(|r| r.success().is_some_and(Option::is_some))
      .await
      .unwrap();
    assert_eq!(found, Resource::Success(Some(submission.clone())));
    assert_eq!(coursework.upload_state().latest(), Some(Resource::Success(submission)));
  }

  #[tokio::test]
  async fn unnamed_upload_gets_generated_name() {
    let (store, _) = backend().await;
    let coursework = Coursework::new(store);
    let submission = coursework
      .submit(&student("s1"), "a1", upload(None, b"x"))
      .await
      .unwrap();
    assert!(submission.file_name.unwrap().starts_with("assignment_"));
  }

  #[tokio::test]
  async fn path_like_file_names_are_rejected() {
    let (store, _) = backend().await;
    let coursework = Coursework::new(store);
    for name in ["../escape", "a/b", "", ".."] {
      let err = coursework
        .submit(&student("s1"), "a1", upload(Some(name), b"x"))
        .await
        .unwrap_err();
      assert!(matches!(err, Error::InvalidInput(_)), "{name:?}");
    }
  }

  #[tokio::test]
  async fn results_join_titles_and_skip_ungraded() {
    let (store, _) = backend().await;
    put(&*store, Collection::Assignments, "a1", json!({"title": "Algebra"})).await;
    put(&*store, Collection::Submissions, "sub1", json!({
      "assignmentId": "a1", "studentId": "s1", "grade": "A",
      "submittedAt": "2024-02-01T10:00:00Z", "status": "Graded",
    })).await;
    put(&*store, Collection::Submissions, "sub2", json!({
      "assignmentId": "gone", "studentId": "s1", "grade": "B",
      "submittedAt": "2024-03-01T10:00:00Z", "status": "Graded",
    })).await;
    put(&*store, Collection::Submissions, "sub3", json!({
      "assignmentId": "a1", "studentId": "s1",
      "submittedAt": "2024-04-01T10:00:00Z",
    })).await;
    put(&*store, Collection::Submissions, "other", json!({
      "assignmentId": "a1", "studentId": "s2", "grade": "C",
    })).await;

    let coursework = Coursework::new(store.clone());
    let mut results = coursework.results(&student("s1")).await.unwrap();
    let list = results.settled().await.unwrap().unwrap();

    let rows: Vec<_> = list.iter().map(|r| (r.id.as_str(), r.subject.as_str(), r.grade.as_str())).collect();
    assert_eq!(rows, [("sub2", GradeResult::UNKNOWN_SUBJECT, "B"), ("sub1", "Algebra", "A")]);

    store
      .update(Collection::Submissions, "sub3", {
        let mut f = rollcall_core::document::Fields::new();
        f.insert("grade".into(), json!("A+"));
        f
      })
      .await
      .unwrap();
    let updated = results
      .wait_for(|r| r.success().is_some_and(|l| l.len() == 3))
      .await
      .unwrap();
    assert_eq!(updated.success().unwrap()[0].id, "sub3");
  }

  #[tokio::test]
  async fn reports_list_every_submission() {
    let (store, _) = backend().await;
    let coursework = Coursework::new(store);
    coursework.submit(&student("s1"), "a1", upload(Some("one.txt"), b"1")).await.unwrap();
    coursework.submit(&student("s2"), "a1", upload(Some("two.txt"), b"2")).await.unwrap();

    let mut all = coursework.all_submissions().await.unwrap();
    let list = all
      .wait_for(|r| r.success().is_some_and(|l| l.len() == 2))
      .await
      .unwrap();
    assert!(list.success().is_some());
  }
}
