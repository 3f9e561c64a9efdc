//! [`SqliteIdentity`]: email/password identity provider on the shared
//! SQLite connection.
//!
//! Passwords are stored as argon2 PHC strings. Hashing and verification run
//! on the blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use rollcall_core::{
  account::{SubjectId, normalize_email},
  backend::IdentityProvider,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{encode_dt, new_id},
};

/// Shortest password accepted by [`IdentityProvider::sign_up`].
pub const MIN_PASSWORD_LEN: usize = 6;

/// Identity provider over the `credentials` and `sessions` tables.
///
/// Obtain one from [`crate::SqliteStore::identity`]. Cloning is cheap.
#[derive(Clone)]
pub struct SqliteIdentity {
  conn: tokio_rusqlite::Connection,
}

impl SqliteIdentity {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }
}

async fn hash_password(password: String) -> Result<String> {
  tokio::task::spawn_blocking(move || {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::PasswordHash(e.to_string()))
  })
  .await?
}

async fn verify_password(password: String, phc: String) -> Result<bool> {
  tokio::task::spawn_blocking(move || {
    let parsed = PasswordHash::new(&phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok(),
    )
  })
  .await?
}

impl IdentityProvider for SqliteIdentity {
  type Error = Error;

  async fn sign_in(&self, email: &str, password: &str) -> Result<SubjectId> {
    let email = normalize_email(email);

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, password_hash FROM credentials WHERE email = ?1",
              rusqlite::params![email],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some((subject_id, phc)) = row else {
      return Err(Error::InvalidCredentials);
    };
    if !verify_password(password.to_owned(), phc).await? {
      return Err(Error::InvalidCredentials);
    }

    let at_str = encode_dt(Utc::now());
    let id_str = subject_id.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (subject_id, signed_in_at) VALUES (?1, ?2)
           ON CONFLICT (subject_id) DO UPDATE SET signed_in_at = excluded.signed_in_at",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(subject = %subject_id, "signed in");
    Ok(SubjectId::new(subject_id))
  }

  async fn sign_up(&self, email: &str, password: &str) -> Result<SubjectId> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
      return Err(Error::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
    }

    let phc        = hash_password(password.to_owned()).await?;
    let subject_id = new_id();
    let id_str     = subject_id.clone();
    let at_str     = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO credentials (subject_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (email) DO NOTHING",
          rusqlite::params![id_str, email, phc, at_str],
        )?;
        Ok(n)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::EmailInUse);
    }

    tracing::info!(subject = %subject_id, "credential created");
    Ok(SubjectId::new(subject_id))
  }

  async fn sign_out(&self, subject: &SubjectId) -> Result<()> {
    let id_str = subject.as_str().to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn has_session(&self, subject: &SubjectId) -> Result<bool> {
    let id_str = subject.as_str().to_owned();
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM sessions WHERE subject_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }
}
