//! [`SqliteStore`]: the SQLite implementation of [`LeadStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use leadline_core::{
  lead::{Lead, LeadPatch, NewLead},
  store::{LeadStore, OrderSpec},
};

use crate::{
  Result,
  encode::{
    LEAD_COLUMNS, RawLead, encode_dt, encode_status, encode_uuid, order_clause,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lead store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

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

  async fn fetch(&self, id: Uuid) -> Result<Option<Lead>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
              rusqlite::params![id_str],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }
}

// ─── LeadStore impl ──────────────────────────────────────────────────────────

impl LeadStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewLead) -> Result<Lead> {
    let now = Utc::now();
    let lead = Lead {
      id:           Uuid::new_v4(),
      created_at:   now,
      updated_at:   now,
      email:        input.email,
      message:      input.message,
      status:       input.status,
      source:       input.source,
      contact_date: input.contact_date,
    };

    let id_str           = encode_uuid(lead.id);
    let created_at_str   = encode_dt(lead.created_at);
    let email            = lead.email.clone();
    let message          = lead.message.clone();
    let status_str       = encode_status(lead.status);
    let source           = lead.source.clone();
    let contact_date_str = encode_dt(lead.contact_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leads (
             id, created_at, updated_at, email, message,
             status, source, contact_date
           ) VALUES (?1, ?2, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            created_at_str,
            email,
            message,
            status_str,
            source,
            contact_date_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(lead)
  }

  async fn list(&self, order: Option<OrderSpec>) -> Result<Vec<Lead>> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads {}", order_clause(order));

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawLead::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn get(&self, id: Uuid) -> Result<Option<Lead>> { self.fetch(id).await }

  async fn update(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>> {
    let id_str           = encode_uuid(id);
    let updated_at_str   = encode_dt(Utc::now());
    let email            = patch.email;
    let message          = patch.message;
    let status_str       = patch.status.map(encode_status);
    let source           = patch.source;
    let contact_date_str = patch.contact_date.map(encode_dt);

    // Absent patch fields bind NULL and COALESCE keeps the stored value.
    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE leads SET
                   email        = COALESCE(?2, email),
                   message      = COALESCE(?3, message),
                   status       = COALESCE(?4, status),
                   source       = COALESCE(?5, source),
                   contact_date = COALESCE(?6, contact_date),
                   updated_at   = ?7
                 WHERE id = ?1
                 RETURNING {LEAD_COLUMNS}"
              ),
              rusqlite::params![
                id_str,
                email,
                message,
                status_str,
                source,
                contact_date_str,
                updated_at_str,
              ],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM leads WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }
}
