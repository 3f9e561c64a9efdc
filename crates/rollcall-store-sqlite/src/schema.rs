//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Schemaless documents. `seq` preserves insertion order for unordered
-- queries and survives upserts of an existing id.
CREATE TABLE IF NOT EXISTS documents (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    collection  TEXT NOT NULL,
    doc_id      TEXT NOT NULL,
    fields      TEXT NOT NULL,   -- JSON object
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL,
    UNIQUE (collection, doc_id)
);

-- Identity-provider credentials. Unrelated to `documents`: a profile in
-- `users` shares the subject id but nothing enforces that it exists.
CREATE TABLE IF NOT EXISTS credentials (
    subject_id     TEXT PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    password_hash  TEXT NOT NULL,          -- argon2 PHC string
    created_at     TEXT NOT NULL
);

-- One open provider session per subject.
CREATE TABLE IF NOT EXISTS sessions (
    subject_id    TEXT PRIMARY KEY,
    signed_in_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    path          TEXT PRIMARY KEY,
    content       BLOB NOT NULL,
    content_hash  TEXT NOT NULL,   -- SHA-256 hex
    uploaded_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection, seq);

PRAGMA user_version = 1;
";
