//! Intake validation: required fields and a basic email-shape check.
//!
//! Runs client-side before any network call, and again in the API before a
//! lead is persisted.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// local@domain.tld with no whitespace and exactly one `@`.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("email is required")]
  MissingEmail,

  #[error("message is required")]
  MissingMessage,

  #[error("not a valid email address: {0:?}")]
  InvalidEmail(String),
}

/// Whether `email` looks like an address. This is a shape check only; no
/// deliverability is implied.
pub fn is_email_shaped(email: &str) -> bool { EMAIL_REGEX.is_match(email) }

/// Check the fields the intake form marks as required.
pub fn validate_submission(
  email: &str,
  message: &str,
) -> Result<(), ValidationError> {
  let email = email.trim();
  if email.is_empty() {
    return Err(ValidationError::MissingEmail);
  }
  if message.trim().is_empty() {
    return Err(ValidationError::MissingMessage);
  }
  if !is_email_shaped(email) {
    return Err(ValidationError::InvalidEmail(email.to_owned()));
  }
  Ok(())
}
