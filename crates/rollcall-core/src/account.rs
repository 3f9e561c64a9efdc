//! Accounts, roles and the navigation policy derived from them.
//!
//! An account is the profile document stored under `users/{uid}`. Its id is
//! the subject id issued by the identity provider, so a credential and a
//! profile are linked only by sharing that string.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::document::{Collection, Record};

// ─── Subject id ──────────────────────────────────────────────────────────────

/// Stable identifier issued by the identity provider for a principal.
///
/// Opaque: nothing in Rollcall parses or validates it. A scanned QR payload
/// is turned into a `SubjectId` verbatim.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SubjectId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for SubjectId {
  fn from(s: String) -> Self { Self(s) }
}

/// Canonical form of an email address: trimmed and lower-cased. Credentials
/// and profiles both store this form.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

// ─── Role ────────────────────────────────────────────────────────────────────

/// A role held by an account. Declaration order is navigation priority, so
/// the derived `Ord` sorts the most privileged role first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Teacher,
  Student,
}

impl Role {
  /// Routing priority: the first held role in this list wins.
  pub const PRIORITY: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

  /// Roles an administrator may pick when creating an account. ADMIN is left
  /// out by surface policy only; nothing below the surface rejects it.
  pub const SELECTABLE: [Role; 2] = [Role::Teacher, Role::Student];

  pub fn is_selectable(self) -> bool { Self::SELECTABLE.contains(&self) }
}

// ─── Destination ─────────────────────────────────────────────────────────────

/// Where a signed-in subject lands after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
  AdminDashboard,
  TeacherDashboard,
  StudentDashboard,
  /// The profile holds no recognised role. The session is left intact.
  Unassigned,
}

impl Destination {
  /// Pick the destination by [`Role::PRIORITY`].
  pub fn for_roles(roles: &BTreeSet<Role>) -> Self {
    match Role::PRIORITY.into_iter().find(|r| roles.contains(r)) {
      Some(Role::Admin) => Self::AdminDashboard,
      Some(Role::Teacher) => Self::TeacherDashboard,
      Some(Role::Student) => Self::StudentDashboard,
      None => Self::Unassigned,
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// The profile document for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  #[serde(rename = "uid", default)]
  pub subject_id: SubjectId,
  #[serde(default)]
  pub email:      String,
  /// Unrecognised role names are dropped on read rather than failing the
  /// whole profile; such an account routes to [`Destination::Unassigned`].
  #[serde(default, deserialize_with = "lenient_roles")]
  pub roles:      BTreeSet<Role>,
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<BTreeSet<Role>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let names = Vec::<serde_json::Value>::deserialize(deserializer)?;
  Ok(
    names
      .iter()
      .filter_map(|v| v.as_str())
      .filter_map(|name| name.parse().ok())
      .collect(),
  )
}

impl Account {
  pub fn new(
    subject_id: SubjectId,
    email: impl Into<String>,
    roles: impl IntoIterator<Item = Role>,
  ) -> Self {
    Self {
      subject_id,
      email: email.into(),
      roles: roles.into_iter().collect(),
    }
  }

  pub fn has_role(&self, role: Role) -> bool { self.roles.contains(&role) }

  pub fn destination(&self) -> Destination { Destination::for_roles(&self.roles) }
}

impl Record for Account {
  const COLLECTION: Collection = Collection::Users;

  fn assign_id(&mut self, id: &str) {
    // Profiles written by hand may omit `uid`; the document id is the truth.
    if self.subject_id.as_str().is_empty() {
      self.subject_id = SubjectId::new(id);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn priority_prefers_admin_then_teacher() {
    let both = BTreeSet::from([Role::Student, Role::Teacher]);
    assert_eq!(Destination::for_roles(&both), Destination::TeacherDashboard);

    let all = BTreeSet::from([Role::Student, Role::Admin, Role::Teacher]);
    assert_eq!(Destination::for_roles(&all), Destination::AdminDashboard);
  }

  #[test]
  fn no_roles_is_unassigned() {
    assert_eq!(
      Destination::for_roles(&BTreeSet::new()),
      Destination::Unassigned
    );
  }

  #[test]
  fn roles_use_upper_case_names() {
    let json = serde_json::to_string(&Role::Teacher).unwrap();
    assert_eq!(json, "\"TEACHER\"");
    assert_eq!(Role::from_str("student").unwrap(), Role::Student);
    assert_eq!(Role::Admin.to_string(), "ADMIN");
  }

  #[test]
  fn account_fields_are_camel_case() {
    let account = Account::new("u1".into(), "a@x.com", [Role::Student]);
    let value = serde_json::to_value(&account).unwrap();
    assert_eq!(value["uid"], "u1");
    assert_eq!(value["roles"], serde_json::json!(["STUDENT"]));
  }

  #[test]
  fn unknown_roles_are_dropped() {
    let account: Account = serde_json::from_value(serde_json::json!({
      "uid": "u2",
      "email": "p@x.com",
      "roles": ["PARENT", "STUDENT"],
    }))
    .unwrap();
    assert_eq!(account.roles, BTreeSet::from([Role::Student]));

    let stranger: Account = serde_json::from_value(serde_json::json!({
      "uid": "u3",
      "roles": ["PARENT"],
    }))
    .unwrap();
    assert_eq!(stranger.destination(), Destination::Unassigned);
  }

  #[test]
  fn emails_normalize_to_trimmed_lower_case() {
    assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
  }

  #[test]
  fn admin_is_not_selectable() {
    assert!(!Role::Admin.is_selectable());
    assert!(Role::Teacher.is_selectable());
  }
}
