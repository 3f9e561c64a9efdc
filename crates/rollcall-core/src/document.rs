//! Schemaless documents, typed records and the query shape shared by every
//! document-store backend.
//!
//! Documents are JSON objects grouped into a fixed set of [`Collection`]s. A
//! schema exists only as field presence; [`Record`] types give Rust a typed
//! view of a collection without the store knowing about them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// A JSON object: the body of a document.
pub type Fields = Map<String, Value>;

// ─── Collection ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Collection {
  Users,
  Attendance,
  Assignments,
  Submissions,
  Notifications,
  CourseMaterials,
}

impl Collection {
  /// The collection name as stored, e.g. `"courseMaterials"`.
  pub fn name(self) -> &'static str { self.into() }

  pub fn parse(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnknownCollection(name.to_owned()))
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A stored document: its id within the collection plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub collection: Collection,
  pub id:         String,
  pub fields:     Fields,
}

impl Document {
  pub fn field(&self, name: &str) -> Option<&Value> { self.fields.get(name) }

  /// Decode into a typed record, letting the record pick up the document id.
  pub fn decode<R: Record>(&self) -> Result<R> {
    let mut record: R = serde_json::from_value(Value::Object(self.fields.clone()))?;
    record.assign_id(&self.id);
    Ok(record)
  }
}

/// A typed view of the documents in one collection.
///
/// Ids live outside the fields; a record that wants its id stores it in a
/// `#[serde(skip)]` field and fills it in [`Record::assign_id`].
pub trait Record: Serialize + DeserializeOwned {
  const COLLECTION: Collection;

  fn assign_id(&mut self, _id: &str) {}

  /// Serialise into document fields.
  fn to_fields(&self) -> Result<Fields> {
    match serde_json::to_value(self)? {
      Value::Object(map) => Ok(map),
      _ => Err(Error::NotAnObject {
        collection: Self::COLLECTION,
        id:         String::new(),
      }),
    }
  }
}

/// Decode every document in a snapshot, failing on the first bad one.
pub fn decode_all<R: Record>(docs: &[Document]) -> Result<Vec<R>> {
  docs.iter().map(Document::decode).collect()
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

/// An equality constraint on one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
  pub field: String,
  pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// A collection-scoped query: equality filters and an optional ordering.
/// Without an ordering, documents come back in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
  pub collection: Collection,
  pub filters:    Vec<Filter>,
  pub order_by:   Option<OrderBy>,
}

impl Query {
  pub fn collection(collection: Collection) -> Self {
    Self { collection, filters: Vec::new(), order_by: None }
  }

  pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.push(Filter { field: field.into(), value: value.into() });
    self
  }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order_by = Some(OrderBy { field: field.into(), direction });
    self
  }

  pub fn matches(&self, doc: &Document) -> bool {
    doc.collection == self.collection
      && self
        .filters
        .iter()
        .all(|f| doc.field(&f.field) == Some(&f.value))
  }

  /// Filter and order a collection's documents, given in insertion order.
  /// The sort is stable, so ties keep insertion order.
  pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
    let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

    if let Some(order) = &self.order_by {
      out.sort_by(|a, b| {
        let ord = compare_fields(a.field(&order.field), b.field(&order.field));
        match order.direction {
          Direction::Ascending => ord,
          Direction::Descending => ord.reverse(),
        }
      });
    }
    out
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Total order over optional field values: missing < null < bool < number <
/// string. Two strings that both parse as RFC 3339 compare as instants, since
/// their textual order breaks down with varying fractional-second precision.
pub fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(a), Some(b)) => compare_values(a, b),
  }
}

fn rank(v: &Value) -> u8 {
  match v {
    Value::Null => 0,
    Value::Bool(_) => 1,
    Value::Number(_) => 2,
    Value::String(_) => 3,
    Value::Array(_) => 4,
    Value::Object(_) => 5,
  }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
    (Value::Number(x), Value::Number(y)) => {
      let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
    (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
      (Some(x), Some(y)) => x.cmp(&y),
      _ => x.cmp(y),
    },
    _ => rank(a).cmp(&rank(b)),
  }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}
