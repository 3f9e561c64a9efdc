//! The personal QR code: a student shows it, a teacher scans it.
//!
//! The payload is the bare subject id. It carries no signature, expiry or
//! binding to a session, so anyone who can read it can replay it.

use qrcode::{QrCode, render::svg};
use rollcall_core::account::SubjectId;
use serde::Serialize;

use crate::{Error, Result, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrPayload {
  pub payload: String,
}

/// The payload to render for the signed-in subject.
pub fn payload_for(session: Option<&Session>) -> Result<QrPayload> {
  let session = session.ok_or(Error::NotSignedIn)?;
  Ok(QrPayload { payload: session.subject_id().as_str().to_owned() })
}

/// Smallest edge, in pixels, of a rendered code.
pub const QR_SIZE: u32 = 512;

impl QrPayload {
  /// Render the payload as a black-on-white SVG QR code at least
  /// [`QR_SIZE`] pixels square.
  pub fn to_svg(&self) -> Result<String> {
    let code = QrCode::new(self.payload.as_bytes()).map_err(Error::unexpected)?;
    Ok(
      code
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build(),
    )
  }
}

/// Interpret a scanned payload. Accepted verbatim, empty strings included.
pub fn scanned(payload: &str) -> SubjectId { SubjectId::new(payload) }
