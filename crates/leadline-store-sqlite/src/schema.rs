//! SQL schema for the leadline SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per lead document. Rows are hard-deleted; there is no tombstone.
CREATE TABLE IF NOT EXISTS leads (
    id           TEXT PRIMARY KEY,   -- hyphenated UUID v4; server-assigned
    created_at   TEXT NOT NULL,      -- RFC 3339 UTC, fixed width
    updated_at   TEXT NOT NULL,
    email        TEXT NOT NULL,
    message      TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'new'
                 CHECK (status IN ('new', 'contacted', 'qualified', 'converted', 'closed')),
    source       TEXT NOT NULL DEFAULT 'website',
    contact_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS leads_created_idx ON leads(created_at);
CREATE INDEX IF NOT EXISTS leads_status_idx  ON leads(status);

PRAGMA user_version = 1;
";
