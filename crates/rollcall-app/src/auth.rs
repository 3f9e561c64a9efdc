//! Sign-in, first-administrator signup and sign-out.
//!
//! [`Auth`] owns the explicit [`Session`] for one consumer. Nothing else in
//! the crate reads a "current user"; operations that need one take the
//! session as an argument.

use std::sync::Arc;

use rollcall_core::{
  Feed, Publisher, Resource,
  account::{Account, Role, SubjectId, normalize_email},
  backend::{DocumentStore, IdentityProvider},
  document::{Collection, Query, Record},
};

use crate::{Error, Result, Session, error::state_of, roles::RoleResolver};

/// State of a one-shot operation: `None` until first attempted.
pub type OpState<T> = Option<Resource<T>>;

/// Sign in and resolve the subject's profile into a [`Session`].
///
/// A missing profile fails with [`Error::NotFound`] but leaves the provider
/// session open.
pub async fn authenticate<S, I>(
  identity: &I,
  resolver: &RoleResolver<S>,
  email: &str,
  password: &str,
) -> Result<Session>
where
  S: DocumentStore,
  I: IdentityProvider,
{
  let subject = identity
    .sign_in(email, password)
    .await
    .map_err(Error::provider)?;
  let account = resolver.resolve(&subject).await?;
  Ok(Session::new(account))
}

pub struct Auth<S, I> {
  store:     Arc<S>,
  identity:  Arc<I>,
  resolver:  RoleResolver<S>,
  login:     Publisher<OpState<Session>>,
  signup:    Publisher<OpState<Account>>,
  session:   Publisher<Option<Session>>,
  /// Subject holding an open provider session, with or without a profile.
  signed_in: Publisher<Option<SubjectId>>,
}

impl<S, I> Auth<S, I>
where
  S: DocumentStore,
  I: IdentityProvider,
{
  pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
    let resolver = RoleResolver::new(store.clone());
    Self {
      store,
      identity,
      resolver,
      login: Feed::channel(None).0,
      signup: Feed::channel(None).0,
      session: Feed::channel(None).0,
      signed_in: Feed::channel(None).0,
    }
  }

  // ─── Operations ────────────────────────────────────────────────────────────

  /// Sign in and make the resulting session current.
  pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
    self.login.publish(Some(Resource::Loading));

    let outcome = authenticate(&*self.identity, &self.resolver, email, password).await;
    if let Ok(session) = &outcome {
      tracing::debug!(
        subject = %session.subject_id(),
        destination = ?session.destination,
        "logged in"
      );
      self.session.publish(Some(session.clone()));
    }
    match &outcome {
      Ok(session) => self.signed_in.publish(Some(session.subject_id().clone())),
      // Signed in at the provider but without a profile; keep the subject so
      // `logout` can still close the provider session.
      Err(Error::NotFound(subject)) => self.signed_in.publish(Some(subject.clone())),
      Err(_) => {}
    }

    self.login.publish(Some(state_of(&outcome)));
    outcome
  }

  /// Create the very first account, which is always an administrator.
  ///
  /// Refuses with [`Error::DuplicateNotAllowed`] once any profile exists.
  /// The check and the create are separate calls, so two concurrent signups
  /// against an empty collection may both succeed. Does not sign in.
  pub async fn create_first_admin(&self, email: &str, password: &str) -> Result<Account> {
    self.signup.publish(Some(Resource::Loading));
    let outcome = self.first_admin(email, password).await;
    self.signup.publish(Some(state_of(&outcome)));
    outcome
  }

  async fn first_admin(&self, email: &str, password: &str) -> Result<Account> {
    let existing = self
      .store
      .query(&Query::collection(Collection::Users))
      .await
      .map_err(Error::store)?;
    if !existing.is_empty() {
      tracing::debug!(accounts = existing.len(), "signup refused");
      return Err(Error::DuplicateNotAllowed);
    }

    let subject = self
      .identity
      .sign_up(email, password)
      .await
      .map_err(Error::provider)?;

    let account = Account::new(subject.clone(), normalize_email(email), [Role::Admin]);
    let fields = account.to_fields().map_err(Error::unexpected)?;
    if let Err(e) = self.store.set(Collection::Users, subject.as_str(), fields).await {
      tracing::warn!(
        %subject,
        error = %e,
        "credential created but profile write failed; credential is orphaned"
      );
      return Err(Error::store(e));
    }

    tracing::info!(%subject, "first administrator created");
    Ok(account)
  }

  /// Close the provider session and forget the current one. Also closes a
  /// provider session left open by a login that failed with
  /// [`Error::NotFound`]. A no-op when nobody is signed in.
  pub async fn logout(&self) -> Result<()> {
    let Some(subject) = self.signed_in.latest() else {
      return Ok(());
    };
    self
      .identity
      .sign_out(&subject)
      .await
      .map_err(Error::provider)?;

    self.signed_in.publish(None);
    self.session.publish(None);
    self.login.publish(None);
    tracing::debug!(%subject, "logged out");
    Ok(())
  }

  // ─── Observers ─────────────────────────────────────────────────────────────

  pub fn current_session(&self) -> Option<Session> { self.session.latest() }

  pub fn current_subject(&self) -> Option<SubjectId> {
    self.session.latest().map(|s| s.subject_id().clone())
  }

  pub fn sessions(&self) -> Feed<Option<Session>> { self.session.subscribe() }

  pub fn login_state(&self) -> Feed<OpState<Session>> { self.login.subscribe() }

  pub fn signup_state(&self) -> Feed<OpState<Account>> { self.signup.subscribe() }
}
