//! Error types for `leadline-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lead not found: {0}")]
  LeadNotFound(Uuid),

  #[error("unknown lead status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown order field: {0:?}")]
  UnknownOrderField(String),

  #[error("invalid submission: {0}")]
  Validation(#[from] ValidationError),

  /// A backend failure, forwarded as-is.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::LeadNotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
