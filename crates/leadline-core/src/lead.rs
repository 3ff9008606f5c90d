//! Lead types: the single entity of the leadline store.
//!
//! A lead is a prospective-customer contact record submitted through the
//! intake form. The store owns `id`, `created_at` and `updated_at`; callers
//! own everything else.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Source label applied when the caller does not supply one.
pub const DEFAULT_SOURCE: &str = "website";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Triage status of a lead. These five values are the only ones ever
/// persisted.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
  #[default]
  New,
  Contacted,
  Qualified,
  Converted,
  Closed,
}

impl LeadStatus {
  pub const ALL: [LeadStatus; 5] = [
    Self::New,
    Self::Contacted,
    Self::Qualified,
    Self::Converted,
    Self::Closed,
  ];

  /// The wire and column representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Contacted => "contacted",
      Self::Qualified => "qualified",
      Self::Converted => "converted",
      Self::Closed => "closed",
    }
  }
}

impl fmt::Display for LeadStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LeadStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Lead ────────────────────────────────────────────────────────────────────

/// A persisted lead document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
  /// Store-assigned; never reassigned and never reused after deletion.
  pub id:           Uuid,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  pub email:        String,
  pub message:      String,
  pub status:       LeadStatus,
  pub source:       String,
  /// The submission instant as seen by the caller; distinct from
  /// `created_at`.
  pub contact_date: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::service::LeadService::create`]. Absent fields take the
/// lead defaults.
#[derive(Debug, Clone)]
pub struct CreateLead {
  pub email:        String,
  pub message:      String,
  pub status:       Option<LeadStatus>,
  pub source:       Option<String>,
  pub contact_date: DateTime<Utc>,
}

impl CreateLead {
  pub fn new(
    email: impl Into<String>,
    message: impl Into<String>,
    contact_date: DateTime<Utc>,
  ) -> Self {
    Self {
      email: email.into(),
      message: message.into(),
      status: None,
      source: None,
      contact_date,
    }
  }

  /// Resolve defaults into the fully-specified store input.
  pub fn into_new_lead(self) -> NewLead {
    NewLead {
      email:        self.email,
      message:      self.message,
      status:       self.status.unwrap_or_default(),
      source:       self
        .source
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_owned()),
      contact_date: self.contact_date,
    }
  }
}

/// Input to [`crate::store::LeadStore::create`]. `id` and the bookkeeping
/// timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewLead {
  pub email:        String,
  pub message:      String,
  pub status:       LeadStatus,
  pub source:       String,
  pub contact_date: DateTime<Utc>,
}

/// A partial update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<LeadStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_date: Option<DateTime<Utc>>,
}

impl LeadPatch {
  pub fn status(status: LeadStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }

  /// Apply this patch to an in-memory copy, leaving bookkeeping fields alone.
  pub fn apply_to(&self, lead: &mut Lead) {
    if let Some(email) = &self.email {
      lead.email = email.clone();
    }
    if let Some(message) = &self.message {
      lead.message = message.clone();
    }
    if let Some(status) = self.status {
      lead.status = status;
    }
    if let Some(source) = &self.source {
      lead.source = source.clone();
    }
    if let Some(contact_date) = self.contact_date {
      lead.contact_date = contact_date;
    }
  }
}
