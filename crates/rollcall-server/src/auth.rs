//! HTTP Basic-auth extractor producing the request's [`Session`].

use std::ops::Deref;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rollcall_app::{Session, auth::authenticate, roles::RoleResolver};
use rollcall_core::{
  account::Role,
  backend::{DocumentStore, IdentityProvider},
};

use crate::{AppState, error::Error};

/// Present in a handler means the caller signed in and has a profile.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl Deref for CurrentSession {
  type Target = Session;

  fn deref(&self) -> &Session { &self.0 }
}

impl CurrentSession {
  /// Reject with 403 unless the session holds one of `roles`.
  pub fn require_any(&self, roles: &[Role]) -> Result<(), Error> {
    if self.0.has_any_role(roles) {
      Ok(())
    } else {
      tracing::debug!(subject = %self.0.subject_id(), ?roles, "forbidden");
      Err(Error::Forbidden)
    }
  }
}

/// Pull `email:password` out of an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

impl<S, I> FromRequestParts<AppState<S, I>> for CurrentSession
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = basic_credentials(&parts.headers)?;
    let resolver = RoleResolver::new(state.store.clone());

    match authenticate(&*state.identity, &resolver, &email, &password).await {
      Ok(session) => Ok(CurrentSession(session)),
      Err(rollcall_app::Error::Provider(_)) => Err(Error::Unauthorized),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderValue, header};

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  #[test]
  fn decodes_basic_credentials() {
    let encoded = B64.encode("a@x.com:pa:ss");
    let (email, password) = basic_credentials(&headers(&format!("Basic {encoded}"))).unwrap();
    assert_eq!(email, "a@x.com");
    assert_eq!(password, "pa:ss");
  }

  #[test]
  fn missing_header() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    assert!(matches!(
      basic_credentials(&headers("Basic !!!not-base64!!!")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_scheme() {
    assert!(matches!(
      basic_credentials(&headers("Bearer abc")),
      Err(Error::Unauthorized)
    ));
  }
}
