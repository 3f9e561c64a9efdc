//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid email or password.")]
  Unauthorized,

  #[error("You do not have access to this page.")]
  Forbidden,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// A live query settled on an error.
  #[error("{0}")]
  Snapshot(String),

  #[error(transparent)]
  App(#[from] rollcall_app::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  fn status(&self) -> StatusCode {
    use rollcall_app::Error as App;

    match self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::App(e) => match e {
        App::NotSignedIn => StatusCode::UNAUTHORIZED,
        App::NotFound(_) => StatusCode::NOT_FOUND,
        App::DuplicateNotAllowed => StatusCode::CONFLICT,
        App::Provider(_) | App::InvalidInput(_) => StatusCode::BAD_REQUEST,
        App::Store(_) | App::WriteFailed(_) | App::Unexpected(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, Error::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"rollcall\""),
      );
    }
    res
  }
}
