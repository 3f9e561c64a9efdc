//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`] and
//! [`FileStore`].

use std::{path::Path, sync::Arc};

use bytes::Bytes;
use chrono::Utc;
use rollcall_core::{
  Feed, Resource,
  backend::{DocumentStore, FileStore, Snapshots},
  document::{Collection, Document, Fields, Query},
};
use rusqlite::OptionalExtension as _;
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;

use crate::{
  Error, Result,
  encode::{RawDocument, decode_fields, encode_dt, encode_fields, new_id},
  identity::SqliteIdentity,
  schema::SCHEMA,
};

/// Buffered change notifications per subscriber before it starts lagging.
/// A lagging subscriber simply re-runs its query.
const CHANGE_BUFFER: usize = 64;

/// Prefix of download URLs returned by [`FileStore::put_file`] unless
/// overridden with [`SqliteStore::with_file_base_url`].
pub const DEFAULT_FILE_BASE_URL: &str = "/api/files";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall document and file store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted and every
/// clone shares the same change-notification channel.
#[derive(Clone)]
pub struct SqliteStore {
  conn:          tokio_rusqlite::Connection,
  changes:       broadcast::Sender<Collection>,
  file_base_url: Arc<str>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(CHANGE_BUFFER);
    let store = Self {
      conn,
      changes,
      file_base_url: Arc::from(DEFAULT_FILE_BASE_URL),
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Use `base` (without trailing slash) as the prefix of download URLs.
  pub fn with_file_base_url(mut self, base: impl AsRef<str>) -> Self {
    self.file_base_url = Arc::from(base.as_ref().trim_end_matches('/'));
    self
  }

  /// An identity provider sharing this store's database.
  pub fn identity(&self) -> SqliteIdentity { SqliteIdentity::new(self.conn.clone()) }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Wake live queries on `collection`. No subscribers is not an error.
  fn notify(&self, collection: Collection) { let _ = self.changes.send(collection); }

  /// Every document in `collection`, in insertion order.
  async fn load_collection(&self, collection: Collection) -> Result<Vec<Document>> {
    let name = collection.name();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc_id, fields FROM documents WHERE collection = ?1 ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |row| {
            Ok(RawDocument { doc_id: row.get(0)?, fields: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_document(collection)).collect()
  }

  /// Insert or replace the row for (`collection`, `id`).
  async fn upsert(&self, collection: Collection, id: String, fields: Fields) -> Result<Document> {
    let fields_str = encode_fields(&fields)?;
    let at_str     = encode_dt(Utc::now());
    let name       = collection.name();
    let id_str     = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, fields, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (collection, doc_id)
           DO UPDATE SET fields = excluded.fields, updated_at = excluded.updated_at",
          rusqlite::params![name, id_str, fields_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    self.notify(collection);
    Ok(Document { collection, id, fields })
  }

  /// Run `query` once and wrap the outcome for publication.
  async fn snapshot(&self, query: &Query) -> Resource<Vec<Document>> {
    match DocumentStore::query(self, query).await {
      Ok(docs) => Resource::Success(docs),
      Err(e) => {
        tracing::warn!(collection = %query.collection, error = %e, "live query failed");
        Resource::Error(e.to_string())
      }
    }
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
    let name   = collection.name();
    let id_str = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc_id, fields FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![name, id_str],
              |row| Ok(RawDocument { doc_id: row.get(0)?, fields: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_document(collection)).transpose()
  }

  async fn add(&self, collection: Collection, fields: Fields) -> Result<Document> {
    self.upsert(collection, new_id(), fields).await
  }

  async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document> {
    self.upsert(collection, id.to_owned(), fields).await
  }

  async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document> {
    let name   = collection.name();
    let id_str = id.to_owned();

    // Read, merge, write. Not atomic: a concurrent writer between the read
    // and the upsert is overwritten.
    let current: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT fields FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![name, id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let Some(current) = current else {
      return Err(Error::DocumentNotFound { collection, id: id.to_owned() });
    };

    let mut base = decode_fields(collection, id, &current)?;
    base.extend(fields);
    self.upsert(collection, id.to_owned(), base).await
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
    let name   = collection.name();
    let id_str = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![name, id_str],
        )?;
        Ok(())
      })
      .await?;

    self.notify(collection);
    Ok(())
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>> {
    let docs = self.load_collection(query.collection).await?;
    Ok(query.apply(docs))
  }

  async fn subscribe(&self, query: Query) -> Result<Snapshots> {
    // Subscribe to changes before the first read so no write can slip in
    // between the initial snapshot and the listener.
    let mut changes = self.changes.subscribe();
    let (publisher, feed): (_, Snapshots) = Feed::channel(Resource::Loading);
    publisher.publish(self.snapshot(&query).await);

    let store = self.clone();
    tokio::spawn(async move {
      loop {
        tokio::select! {
          _ = publisher.closed() => break,
          change = changes.recv() => match change {
            Ok(collection) if collection != query.collection => continue,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
              publisher.publish(store.snapshot(&query).await);
            }
            Err(broadcast::error::RecvError::Closed) => break,
          },
        }
      }
      tracing::debug!(collection = %query.collection, "live query closed");
    });

    Ok(feed)
  }
}

// ─── FileStore impl ──────────────────────────────────────────────────────────

impl FileStore for SqliteStore {
  type Error = Error;

  async fn put_file(&self, path: &str, bytes: Bytes) -> Result<String> {
    let path_str = path.trim_start_matches('/').to_owned();
    let hash     = hex::encode(Sha256::digest(&bytes));
    let at_str   = encode_dt(Utc::now());
    let url      = format!("{}/{}?v={}", self.file_base_url, path_str, &hash[..12]);

    let content = bytes.to_vec();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO files (path, content, content_hash, uploaded_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (path)
           DO UPDATE SET content = excluded.content,
                         content_hash = excluded.content_hash,
                         uploaded_at = excluded.uploaded_at",
          rusqlite::params![path_str, content, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%url, "stored file");
    Ok(url)
  }

  async fn get_file(&self, path: &str) -> Result<Option<Bytes>> {
    let path_str = path.trim_start_matches('/').to_owned();

    let content: Option<Vec<u8>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT content FROM files WHERE path = ?1",
              rusqlite::params![path_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(content.map(Bytes::from))
  }
}
