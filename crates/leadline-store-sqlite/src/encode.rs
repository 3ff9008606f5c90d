//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed nanosecond
//! fraction so that lexicographic `ORDER BY` matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use leadline_core::{
  lead::{Lead, LeadStatus},
  store::{LeadField, OrderSpec},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LeadStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: LeadStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<LeadStatus> {
  s.parse().map_err(Error::Status)
}

// ─── Ordering ────────────────────────────────────────────────────────────────

fn column(field: LeadField) -> &'static str {
  match field {
    LeadField::CreatedAt => "created_at",
    LeadField::UpdatedAt => "updated_at",
    LeadField::Email => "email",
    LeadField::Message => "message",
    LeadField::Status => "status",
    LeadField::Source => "source",
    LeadField::ContactDate => "contact_date",
  }
}

/// The `ORDER BY` clause for `order`. Column names come from a closed match,
/// never from caller input. `rowid` breaks ties in insertion order.
pub fn order_clause(order: Option<OrderSpec>) -> String {
  match order {
    None => "ORDER BY rowid ASC".to_owned(),
    Some(spec) => {
      let dir = if spec.descending { "DESC" } else { "ASC" };
      format!("ORDER BY {} {dir}, rowid {dir}", column(spec.field))
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const LEAD_COLUMNS: &str =
  "id, created_at, updated_at, email, message, status, source, contact_date";

/// Raw strings read directly from a `leads` row.
pub struct RawLead {
  pub id:           String,
  pub created_at:   String,
  pub updated_at:   String,
  pub email:        String,
  pub message:      String,
  pub status:       String,
  pub source:       String,
  pub contact_date: String,
}

impl RawLead {
  /// Map a row selected with [`LEAD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      created_at:   row.get(1)?,
      updated_at:   row.get(2)?,
      email:        row.get(3)?,
      message:      row.get(4)?,
      status:       row.get(5)?,
      source:       row.get(6)?,
      contact_date: row.get(7)?,
    })
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      id:           decode_uuid(&self.id)?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
      email:        self.email,
      message:      self.message,
      status:       decode_status(&self.status)?,
      source:       self.source,
      contact_date: decode_dt(&self.contact_date)?,
    })
  }
}
