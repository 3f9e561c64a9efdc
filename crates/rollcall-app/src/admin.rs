//! Account administration: the live account list and the mutations an
//! administrator can make to it.
//!
//! Only profile documents are touched after creation. Removing an account
//! leaves its credential and any open provider session in place.

use std::sync::Arc;

use rollcall_core::{
  Feed, Publisher, Resource,
  account::{Account, Role, SubjectId, normalize_email},
  backend::{DocumentStore, IdentityProvider},
  document::{Collection, Fields, Query, Record},
};
use serde::Serialize;

use crate::{
  Error, Result,
  auth::OpState,
  error::state_of,
  live::{ListFeed, records},
};

/// Accounts bucketed by role. An account with several roles appears in
/// each matching bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directory {
  pub admins:   Vec<Account>,
  pub teachers: Vec<Account>,
  pub students: Vec<Account>,
}

impl Directory {
  pub fn partition(accounts: &[Account]) -> Self {
    let with = |role: Role| -> Vec<Account> {
      accounts
        .iter()
        .filter(|a| a.has_role(role))
        .cloned()
        .collect()
    };
    Self {
      admins:   with(Role::Admin),
      teachers: with(Role::Teacher),
      students: with(Role::Student),
    }
  }
}

pub struct AccountAdministrator<S, I> {
  store:    Arc<S>,
  identity: Arc<I>,
  update:   Publisher<OpState<()>>,
  delete:   Publisher<OpState<()>>,
  add:      Publisher<OpState<Account>>,
}

impl<S, I> AccountAdministrator<S, I>
where
  S: DocumentStore,
  I: IdentityProvider,
{
  pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
    Self {
      store,
      identity,
      update: Feed::channel(None).0,
      delete: Feed::channel(None).0,
      add: Feed::channel(None).0,
    }
  }

  /// Every profile, republished in full on each change.
  pub async fn list_accounts(&self) -> Result<ListFeed<Account>> {
    records(&*self.store, Query::collection(Collection::Users)).await
  }

  /// The live list bucketed by role.
  pub async fn directory(&self) -> Result<Feed<Resource<Directory>>> {
    let accounts = self.list_accounts().await?;
    Ok(accounts.map(|snapshot| snapshot.clone().map(|a| Directory::partition(&a))))
  }

  /// Give `account` an extra role. Adding a role it already holds still
  /// writes, which wakes every live list.
  pub async fn add_role(&self, account: &Account, role: Role) -> Result<()> {
    self.update.publish(Some(Resource::Loading));
    let outcome = self.grant(account, role).await;
    self.update.publish(Some(state_of(&outcome)));
    outcome
  }

  async fn grant(&self, account: &Account, role: Role) -> Result<()> {
    let mut roles = account.roles.clone();
    roles.insert(role);

    let mut fields = Fields::new();
    fields.insert(
      "roles".to_owned(),
      serde_json::to_value(&roles).map_err(Error::unexpected)?,
    );
    self
      .store
      .update(Collection::Users, account.subject_id.as_str(), fields)
      .await
      .map_err(Error::store)?;

    tracing::info!(subject = %account.subject_id, %role, "role added");
    Ok(())
  }

  /// Delete the profile document. The subject can still sign in, but will
  /// resolve to [`Error::NotFound`].
  pub async fn remove_account(&self, subject: &SubjectId) -> Result<()> {
    self.delete.publish(Some(Resource::Loading));

    let outcome = self
      .store
      .delete(Collection::Users, subject.as_str())
      .await
      .map_err(Error::store);

    if outcome.is_ok() {
      tracing::info!(%subject, "account removed");
    }
    self.delete.publish(Some(state_of(&outcome)));
    outcome
  }

  /// Create a credential and a profile holding exactly `role`.
  ///
  /// Any role is accepted here; keeping ADMIN out of the choices is up to
  /// the caller (see [`Role::SELECTABLE`]).
  pub async fn create_account(&self, email: &str, password: &str, role: Role) -> Result<Account> {
    self.add.publish(Some(Resource::Loading));
    let outcome = self.create(email, password, role).await;
    self.add.publish(Some(state_of(&outcome)));
    outcome
  }

  async fn create(&self, email: &str, password: &str, role: Role) -> Result<Account> {
    let subject = self
      .identity
      .sign_up(email, password)
      .await
      .map_err(Error::provider)?;

    let account = Account::new(subject.clone(), normalize_email(email), [role]);
    let fields = account.to_fields().map_err(Error::unexpected)?;
    if let Err(e) = self.store.set(Collection::Users, subject.as_str(), fields).await {
      tracing::warn!(
        %subject,
        error = %e,
        "credential created but profile write failed; credential is orphaned"
      );
      return Err(Error::store(e));
    }

    tracing::info!(%subject, %role, "account created");
    Ok(account)
  }

  pub fn reset_add_state(&self) { self.add.publish(None); }

  pub fn update_state(&self) -> Feed<OpState<()>> { self.update.subscribe() }

  pub fn delete_state(&self) -> Feed<OpState<()>> { self.delete.subscribe() }

  pub fn add_state(&self) -> Feed<OpState<Account>> { self.add.subscribe() }
}
