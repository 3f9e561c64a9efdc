//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and document bodies as compact
//! JSON objects.

use chrono::{DateTime, Utc};
use rollcall_core::document::{Collection, Document, Fields};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

// ─── Ids ─────────────────────────────────────────────────────────────────────

/// A fresh opaque id for a document or a subject.
pub fn new_id() -> String { Uuid::new_v4().simple().to_string() }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Fields ──────────────────────────────────────────────────────────────────

pub fn encode_fields(fields: &Fields) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_fields(collection: Collection, id: &str, s: &str) -> Result<Fields> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    _ => Err(
      rollcall_core::Error::NotAnObject { collection, id: id.to_owned() }.into(),
    ),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id: String,
  pub fields: String,
}

impl RawDocument {
  pub fn into_document(self, collection: Collection) -> Result<Document> {
    let fields = decode_fields(collection, &self.doc_id, &self.fields)?;
    Ok(Document { collection, id: self.doc_id, fields })
  }
}
