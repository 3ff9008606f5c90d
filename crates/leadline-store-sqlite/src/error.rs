//! Error type for `leadline-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `status` column value outside the enumeration.
  #[error("corrupt status column: {0}")]
  Status(#[source] leadline_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
