//! Integration tests for `SqliteStore` and `SqliteIdentity` against an
//! in-memory database.

use bytes::Bytes;
use rollcall_core::{
  Resource,
  account::SubjectId,
  backend::{DocumentStore, FileStore, IdentityProvider},
  document::{Collection, Direction, Fields, Query},
};
use serde_json::{Value, json};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn fields(v: Value) -> Fields {
  match v {
    Value::Object(m) => m,
    other => panic!("not an object: {other}"),
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_generates_distinct_ids() {
  let s = store().await;
  let a = s
    .add(Collection::Attendance, fields(json!({"studentId": "s1"})))
    .await
    .unwrap();
  let b = s
    .add(Collection::Attendance, fields(json!({"studentId": "s1"})))
    .await
    .unwrap();
  assert_ne!(a.id, b.id);

  let all = s.query(&Query::collection(Collection::Attendance)).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Collection::Users, "nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn set_replaces_whole_document() {
  let s = store().await;
  s.set(Collection::Users, "u1", fields(json!({"email": "a@x.com", "roles": ["ADMIN"]})))
    .await
    .unwrap();
  s.set(Collection::Users, "u1", fields(json!({"email": "b@x.com"})))
    .await
    .unwrap();

  let doc = s.get(Collection::Users, "u1").await.unwrap().unwrap();
  assert_eq!(doc.field("email"), Some(&json!("b@x.com")));
  assert!(doc.field("roles").is_none());
}

#[tokio::test]
async fn update_merges_fields() {
  let s = store().await;
  s.set(Collection::Users, "u1", fields(json!({"email": "a@x.com", "roles": ["STUDENT"]})))
    .await
    .unwrap();
  s.update(Collection::Users, "u1", fields(json!({"roles": ["STUDENT", "TEACHER"]})))
    .await
    .unwrap();

  let doc = s.get(Collection::Users, "u1").await.unwrap().unwrap();
  assert_eq!(doc.field("email"), Some(&json!("a@x.com")));
  assert_eq!(doc.field("roles"), Some(&json!(["STUDENT", "TEACHER"])));
}

#[tokio::test]
async fn update_missing_document_fails() {
  let s = store().await;
  let err = s
    .update(Collection::Users, "ghost", fields(json!({"roles": []})))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DocumentNotFound { .. }));
}

#[tokio::test]
async fn delete_removes_and_tolerates_missing() {
  let s = store().await;
  s.set(Collection::Users, "u1", fields(json!({}))).await.unwrap();
  s.delete(Collection::Users, "u1").await.unwrap();
  assert!(s.get(Collection::Users, "u1").await.unwrap().is_none());
  s.delete(Collection::Users, "u1").await.unwrap();
}

#[tokio::test]
async fn collections_are_isolated() {
  let s = store().await;
  s.set(Collection::Users, "same", fields(json!({"k": 1}))).await.unwrap();
  s.set(Collection::Assignments, "same", fields(json!({"k": 2}))).await.unwrap();

  let user = s.get(Collection::Users, "same").await.unwrap().unwrap();
  assert_eq!(user.field("k"), Some(&json!(1)));
  let users = s.query(&Query::collection(Collection::Users)).await.unwrap();
  assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn query_filters_and_orders() {
  let s = store().await;
  for (student, ts) in [
    ("s1", "2024-01-01T09:00:00Z"),
    ("s2", "2024-01-02T09:00:00Z"),
    ("s1", "2024-01-03T09:00:00Z"),
  ] {
    s.add(Collection::Attendance, fields(json!({"studentId": student, "timestamp": ts})))
      .await
      .unwrap();
  }

  let q = Query::collection(Collection::Attendance)
    .where_eq("studentId", "s1")
    .order_by("timestamp", Direction::Descending);
  let docs = s.query(&q).await.unwrap();
  let stamps: Vec<_> = docs.iter().map(|d| d.field("timestamp").unwrap().clone()).collect();
  assert_eq!(stamps, [json!("2024-01-03T09:00:00Z"), json!("2024-01-01T09:00:00Z")]);
}

// ─── Live queries ────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_delivers_full_snapshots() {
  let s = store().await;
  s.add(Collection::Notifications, fields(json!({"title": "first"})))
    .await
    .unwrap();

  let mut feed = s
    .subscribe(Query::collection(Collection::Notifications))
    .await
    .unwrap();
  assert_eq!(feed.latest().success().map(Vec::len), Some(1));

  s.add(Collection::Notifications, fields(json!({"title": "second"})))
    .await
    .unwrap();
  let snapshot = feed
    .wait_for(|r| r.success().is_some_and(|d| d.len() == 2))
    .await
    .unwrap();
  let Resource::Success(docs) = snapshot else { unreachable!() };
  assert_eq!(docs[0].field("title"), Some(&json!("first")));
}

#[tokio::test]
async fn subscription_ignores_other_collections() {
  let s = store().await;
  let mut feed = s
    .subscribe(Query::collection(Collection::CourseMaterials))
    .await
    .unwrap();

  s.add(Collection::Attendance, fields(json!({}))).await.unwrap();
  s.add(Collection::CourseMaterials, fields(json!({"title": "notes"})))
    .await
    .unwrap();

  let docs = feed.settled().await.unwrap().unwrap();
  // The first settled value may be the initial empty snapshot.
  if docs.is_empty() {
    let next = feed.changed().await.unwrap();
    assert_eq!(next.success().map(Vec::len), Some(1));
  } else {
    assert_eq!(docs.len(), 1);
  }
}

#[tokio::test]
async fn subscription_sees_deletes() {
  let s = store().await;
  s.set(Collection::Users, "u1", fields(json!({"uid": "u1"}))).await.unwrap();
  let mut feed = s.subscribe(Query::collection(Collection::Users)).await.unwrap();

  s.delete(Collection::Users, "u1").await.unwrap();
  let empty = feed
    .wait_for(|r| r.success().is_some_and(Vec::is_empty))
    .await;
  assert!(empty.is_some());
}

// ─── Files ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_file() {
  let s = store().await.with_file_base_url("https://class.example/files/");
  let url = s
    .put_file("assignments/a1/essay.txt", Bytes::from_static(b"hello"))
    .await
    .unwrap();
  assert!(url.starts_with("https://class.example/files/assignments/a1/essay.txt?v="));

  let bytes = s.get_file("assignments/a1/essay.txt").await.unwrap().unwrap();
  assert_eq!(&bytes[..], b"hello");
  assert!(s.get_file("assignments/a1/other.txt").await.unwrap().is_none());
}

#[tokio::test]
async fn replacing_a_file_changes_its_url() {
  let s = store().await;
  let first = s.put_file("m/notes.txt", Bytes::from_static(b"v1")).await.unwrap();
  let second = s.put_file("m/notes.txt", Bytes::from_static(b"v2")).await.unwrap();
  assert_ne!(first, second);
  assert_eq!(&s.get_file("m/notes.txt").await.unwrap().unwrap()[..], b"v2");
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_sign_in() {
  let s = store().await;
  let id = s.identity();

  let created = id.sign_up("Ada@Example.com ", "secret1").await.unwrap();
  assert!(!id.has_session(&created).await.unwrap());

  let signed_in = id.sign_in("ada@example.com", "secret1").await.unwrap();
  assert_eq!(created, signed_in);
  assert!(id.has_session(&signed_in).await.unwrap());

  id.sign_out(&signed_in).await.unwrap();
  assert!(!id.has_session(&signed_in).await.unwrap());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  let id = s.identity();
  id.sign_up("a@x.com", "secret1").await.unwrap();
  let err = id.sign_up("A@X.com", "secret2").await.unwrap_err();
  assert!(matches!(err, Error::EmailInUse));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
  let s = store().await;
  let id = s.identity();
  id.sign_up("a@x.com", "secret1").await.unwrap();

  let wrong = id.sign_in("a@x.com", "nope!!").await.unwrap_err();
  let unknown = id.sign_in("b@x.com", "secret1").await.unwrap_err();
  assert!(matches!(wrong, Error::InvalidCredentials));
  assert!(matches!(unknown, Error::InvalidCredentials));
}

#[tokio::test]
async fn sign_up_validates_input() {
  let s = store().await;
  let id = s.identity();
  assert!(matches!(
    id.sign_up("not-an-email", "secret1").await,
    Err(Error::InvalidEmail)
  ));
  assert!(matches!(
    id.sign_up("a@x.com", "123").await,
    Err(Error::WeakPassword(6))
  ));
}

#[tokio::test]
async fn sessions_do_not_depend_on_profiles() {
  let s = store().await;
  let id = s.identity();
  id.sign_up("a@x.com", "secret1").await.unwrap();
  let subject = id.sign_in("a@x.com", "secret1").await.unwrap();

  // No `users` document exists; the provider session is still open.
  assert!(s.get(Collection::Users, subject.as_str()).await.unwrap().is_none());
  assert!(id.has_session(&subject).await.unwrap());
  assert!(!id.has_session(&SubjectId::new("someone-else")).await.unwrap());
}
