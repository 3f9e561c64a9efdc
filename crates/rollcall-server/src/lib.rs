//! JSON HTTP surface for Rollcall.
//!
//! Exposes an axum [`Router`] over any document store, file store and
//! identity provider. Every route except `POST /api/signup` authenticates
//! with HTTP Basic credentials checked against the identity provider; the
//! resolved [`Session`](rollcall_app::Session) is the request context.
//!
//! List endpoints answer with the first settled snapshot of the matching
//! live feed.

pub mod auth;
pub mod error;
pub mod routes;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use rollcall_core::backend::{DocumentStore, FileStore, IdentityProvider};
use rollcall_store_sqlite::DEFAULT_FILE_BASE_URL;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROLLCALL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Absolute origin used in download URLs, e.g. `https://class.example`.
  /// Download URLs are relative when unset.
  #[serde(default)]
  pub public_base_url: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  /// Prefix for the URLs the file store hands out; matches the
  /// `/api/files` route.
  pub fn file_base_url(&self) -> String {
    match &self.public_base_url {
      Some(origin) => format!("{}{DEFAULT_FILE_BASE_URL}", origin.trim_end_matches('/')),
      None => DEFAULT_FILE_BASE_URL.to_string(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, I> {
  pub store:    Arc<S>,
  pub identity: Arc<I>,
}

impl<S, I> Clone for AppState<S, I> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), identity: self.identity.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full router, with the API nested under `/api` and request
/// tracing on every route.
pub fn router<S, I>(state: AppState<S, I>) -> Router
where
  S: DocumentStore + FileStore + 'static,
  I: IdentityProvider + 'static,
{
  Router::new()
    .nest("/api", routes::api_router(state))
    .layer(TraceLayer::new_for_http())
}
