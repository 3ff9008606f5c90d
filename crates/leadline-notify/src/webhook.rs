//! The automation webhook leg.
//!
//! The request is fire-and-forget: once the body has been handed to the
//! endpoint, its status and body are discarded unread. Only transport errors
//! are reported.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::Result;

/// `yyyy-MM-dd HH:mm:ss`, the format the automation endpoint expects.
pub const WEBHOOK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_webhook_date<Tz>(at: &DateTime<Tz>) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display,
{
  at.format(WEBHOOK_DATE_FORMAT).to_string()
}

/// JSON body POSTed to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
  pub email:   String,
  pub message: String,
  #[serde(rename = "leadId")]
  pub lead_id: String,
  pub date:    String,
  pub source:  String,
}

/// A fixed automation endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct Webhook {
  client: reqwest::Client,
  url:    String,
}

impl Webhook {
  pub fn new(url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder().build()?;
    Ok(Self::with_client(client, url))
  }

  pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
    Self { client, url: url.into() }
  }

  /// POST `payload` as JSON. The response is dropped without inspection.
  pub async fn post(&self, payload: &WebhookPayload) -> Result<()> {
    let _response = self.client.post(&self.url).json(payload).send().await?;
    Ok(())
  }
}
