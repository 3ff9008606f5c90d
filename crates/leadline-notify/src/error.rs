//! Error type for `leadline-notify`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport-level failure: DNS, connect, TLS, or body serialisation.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The email provider answered with a non-success status.
  #[error("email provider rejected the message: {status}: {body}")]
  Provider {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("mail transport misconfigured: {0}")]
  Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
