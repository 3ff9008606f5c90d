//! The email-sending capability and its transports.
//!
//! [`Mailer`] is provider-agnostic: `(to, subject, body)`, async. The
//! [`MailTransport`] enum picks a concrete transport from configuration.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A plaintext email to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
  pub to:      String,
  pub subject: String,
  pub body:    String,
}

/// Something that can deliver an [`OutgoingEmail`].
pub trait Mailer: Send + Sync {
  fn send(
    &self,
    email: &OutgoingEmail,
  ) -> impl Future<Output = Result<()>> + Send;
}

// ─── Log transport ───────────────────────────────────────────────────────────

/// Writes the email to the log instead of sending it. The development
/// default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    tracing::info!(
      to = %email.to,
      subject = %email.subject,
      body = %email.body,
      "email (log transport)"
    );
    Ok(())
  }
}

// ─── HTTP transport ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProviderRequest<'a> {
  from:    &'a str,
  to:      [&'a str; 1],
  subject: &'a str,
  text:    &'a str,
}

/// Sends through a transactional-email HTTP API: a JSON POST authenticated
/// with a bearer key.
#[derive(Debug, Clone)]
pub struct HttpMailer {
  client:   reqwest::Client,
  endpoint: String,
  api_key:  String,
  from:     String,
}

impl HttpMailer {
  pub fn new(
    endpoint: impl Into<String>,
    api_key: impl Into<String>,
    from: impl Into<String>,
  ) -> Result<Self> {
    let endpoint = endpoint.into();
    if endpoint.is_empty() {
      return Err(Error::Config("http transport needs an endpoint".into()));
    }
    Ok(Self {
      client: reqwest::Client::builder().build()?,
      endpoint,
      api_key: api_key.into(),
      from: from.into(),
    })
  }
}

impl Mailer for HttpMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    let body = ProviderRequest {
      from:    &self.from,
      to:      [&email.to],
      subject: &email.subject,
      text:    &email.body,
    };

    let resp = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Provider { status, body });
    }
    Ok(())
  }
}

// ─── Configured transport ────────────────────────────────────────────────────

/// Mail settings, as found under `[mail]` in the configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum MailConfig {
  #[default]
  Log,
  Http {
    endpoint: String,
    #[serde(default)]
    api_key:  String,
    from:     String,
  },
}

/// The transport selected by a [`MailConfig`].
#[derive(Debug, Clone)]
pub enum MailTransport {
  Log(LogMailer),
  Http(HttpMailer),
}

impl MailTransport {
  pub fn from_config(config: &MailConfig) -> Result<Self> {
    Ok(match config {
      MailConfig::Log => Self::Log(LogMailer),
      MailConfig::Http { endpoint, api_key, from } => {
        Self::Http(HttpMailer::new(endpoint, api_key, from)?)
      }
    })
  }
}

impl Mailer for MailTransport {
  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    match self {
      Self::Log(m) => m.send(email).await,
      Self::Http(m) => m.send(email).await,
    }
  }
}
