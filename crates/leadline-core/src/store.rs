//! The `LeadStore` trait and its ordering type.
//!
//! The trait is implemented by storage backends (`leadline-store-sqlite` on
//! the server, the HTTP client in `leadline-cli`). Everything above a backend
//! goes through [`crate::service::LeadService`].

use std::{fmt, future::Future, str::FromStr};

use uuid::Uuid;

use crate::{
  Error,
  lead::{Lead, LeadPatch, NewLead},
};

// ─── Ordering ────────────────────────────────────────────────────────────────

/// A sortable lead field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
  CreatedAt,
  UpdatedAt,
  Email,
  Message,
  Status,
  Source,
  ContactDate,
}

impl LeadField {
  /// The canonical (snake_case) field name.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::Email => "email",
      Self::Message => "message",
      Self::Status => "status",
      Self::Source => "source",
      Self::ContactDate => "contact_date",
    }
  }
}

impl FromStr for LeadField {
  type Err = Error;

  /// Accepts the logical names callers use (`createdDate`) alongside the
  /// stored ones.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "createdDate" | "created_date" | "createdAt" | "created_at"
      | "$createdAt" => Ok(Self::CreatedAt),
      "updatedDate" | "updated_date" | "updatedAt" | "updated_at"
      | "$updatedAt" => Ok(Self::UpdatedAt),
      "contactDate" | "contact_date" => Ok(Self::ContactDate),
      "email" => Ok(Self::Email),
      "message" => Ok(Self::Message),
      "status" => Ok(Self::Status),
      "source" => Ok(Self::Source),
      other => Err(Error::UnknownOrderField(other.to_owned())),
    }
  }
}

/// Sort order for [`LeadStore::list`]. Parsed from a field name optionally
/// prefixed with `-` for descending, e.g. `-createdDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
  pub field:      LeadField,
  pub descending: bool,
}

impl OrderSpec {
  pub fn asc(field: LeadField) -> Self { Self { field, descending: false } }

  pub fn desc(field: LeadField) -> Self { Self { field, descending: true } }

  /// Newest first; what the admin panel asks for.
  pub fn newest_first() -> Self { Self::desc(LeadField::CreatedAt) }
}

impl FromStr for OrderSpec {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.strip_prefix('-') {
      Some(field) => Ok(Self::desc(field.parse()?)),
      None => Ok(Self::asc(s.parse()?)),
    }
  }
}

impl fmt::Display for OrderSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.descending {
      f.write_str("-")?;
    }
    f.write_str(self.field.as_str())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a lead document store.
///
/// Absence is reported as a value (`None` / `false`);
/// [`crate::service::LeadService`] turns it into [`Error::LeadNotFound`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LeadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new lead. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn create(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Every lead, fully materialised, sorted by `order`. Without an order the
  /// store's insertion order is used. Ties always fall back to insertion
  /// order in the requested direction so repeated listings agree.
  fn list(
    &self,
    order: Option<OrderSpec>,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + '_;

  /// Retrieve a lead by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// Merge `patch` into an existing lead and bump `updated_at`. Returns
  /// `None` if not found.
  fn update(
    &self,
    id: Uuid,
    patch: LeadPatch,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// Remove a lead permanently. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
