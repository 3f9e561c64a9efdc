//! The explicit signed-in context threaded through presenter operations.

use rollcall_core::account::{Account, Destination, Role, SubjectId};
use serde::Serialize;

/// Who is signed in and what they may see. Built once at login from the
/// resolved profile; not refreshed if the profile changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
  pub account:     Account,
  pub destination: Destination,
}

impl Session {
  pub fn new(account: Account) -> Self {
    let destination = account.destination();
    Self { account, destination }
  }

  pub fn subject_id(&self) -> &SubjectId { &self.account.subject_id }

  pub fn has_role(&self, role: Role) -> bool { self.account.has_role(role) }

  /// True if the session holds at least one of `roles`.
  pub fn has_any_role(&self, roles: &[Role]) -> bool {
    roles.iter().any(|r| self.has_role(*r))
  }
}
