//! The Notification Function: the server-side creation trigger.
//!
//! The backend calls it with the created lead document. Depending on the
//! trigger, that document arrives either parsed or as a JSON string, and
//! either bare or wrapped one level deep under `payload`. The function
//! always answers with a [`TriggerResponse`]; failures are reported in-band.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::mailer::{Mailer, OutgoingEmail};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
  #[error("Invalid payload")]
  InvalidPayload,

  #[error("Missing lead data")]
  MissingLeadData,
}

/// The event payload as delivered by the trigger.
#[derive(Debug, Clone)]
pub enum TriggerPayload {
  /// Serialised JSON text.
  Raw(String),
  /// An already-parsed document.
  Document(Value),
}

/// The result reported back to the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

impl TriggerResponse {
  pub fn ok() -> Self { Self { success: true, error: None } }

  pub fn failed(error: impl ToString) -> Self {
    Self { success: false, error: Some(error.to_string()) }
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// The fields the operator email is built from. Only `email` and `message`
/// are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerLead {
  pub email:        String,
  pub message:      String,
  pub status:       Option<String>,
  pub source:       Option<String>,
  pub contact_date: Option<String>,
  pub created_at:   Option<String>,
}

fn text(doc: &Value, keys: &[&str]) -> Option<String> {
  keys
    .iter()
    .find_map(|k| doc.get(*k).and_then(Value::as_str))
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// Read a lead out of one document shape, if it has the required fields.
fn lead_from(doc: &Value) -> Option<TriggerLead> {
  Some(TriggerLead {
    email:        text(doc, &["email"])?,
    message:      text(doc, &["message"])?,
    status:       text(doc, &["status"]),
    source:       text(doc, &["source"]),
    contact_date: text(doc, &["contact_date", "contactDate"]),
    created_at:   text(doc, &["created_at", "createdAt", "$createdAt"]),
  })
}

fn parse_json(raw: &str) -> Result<Value, TriggerError> {
  serde_json::from_str(raw).map_err(|_| TriggerError::InvalidPayload)
}

/// Try the document as-is, then one level down under `payload`.
pub fn parse_trigger(payload: TriggerPayload) -> Result<TriggerLead, TriggerError> {
  let doc = match payload {
    TriggerPayload::Raw(raw) => parse_json(&raw)?,
    TriggerPayload::Document(doc) => doc,
  };
  // A document that was serialised twice arrives as a JSON string.
  let doc = match doc {
    Value::String(raw) => parse_json(&raw)?,
    doc => doc,
  };

  if let Some(lead) = lead_from(&doc) {
    return Ok(lead);
  }

  let wrapped = match doc.get("payload") {
    Some(Value::String(raw)) => parse_json(raw)?,
    Some(inner) => inner.clone(),
    None => return Err(TriggerError::MissingLeadData),
  };
  lead_from(&wrapped).ok_or(TriggerError::MissingLeadData)
}

// ─── Email ───────────────────────────────────────────────────────────────────

const UNKNOWN: &str = "unknown";

impl TriggerLead {
  pub fn subject(&self) -> String {
    format!("New Lead from {}", self.source.as_deref().unwrap_or("website"))
  }

  pub fn body(&self) -> String {
    let created = self
      .created_at
      .clone()
      .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    format!(
      "New Lead Alert!\n\
       \n\
       You have received a new lead from your website:\n\
       - Email: {}\n\
       - Message: {}\n\
       - Status: {}\n\
       - Source: {}\n\
       - Contact Date: {}\n\
       - Created: {}\n\
       \n\
       Please follow up with this lead as soon as possible!\n",
      self.email,
      self.message,
      self.status.as_deref().unwrap_or(UNKNOWN),
      self.source.as_deref().unwrap_or(UNKNOWN),
      self.contact_date.as_deref().unwrap_or_default(),
      created,
    )
  }
}

// ─── Function ────────────────────────────────────────────────────────────────

/// Sends one operator email per created lead.
pub struct NotificationFunction<M> {
  mailer:         M,
  operator_email: String,
}

impl<M: Mailer> NotificationFunction<M> {
  pub fn new(mailer: M, operator_email: impl Into<String>) -> Self {
    Self { mailer, operator_email: operator_email.into() }
  }

  pub fn mailer(&self) -> &M { &self.mailer }

  /// Handle one creation event. Never panics or propagates an error.
  pub async fn handle(&self, payload: TriggerPayload) -> TriggerResponse {
    let lead = match parse_trigger(payload) {
      Ok(lead) => lead,
      Err(e) => {
        tracing::error!(error = %e, "lead notification rejected");
        return TriggerResponse::failed(e);
      }
    };

    let email = OutgoingEmail {
      to:      self.operator_email.clone(),
      subject: lead.subject(),
      body:    lead.body(),
    };

    match self.mailer.send(&email).await {
      Ok(()) => {
        tracing::info!(to = %email.to, lead_email = %lead.email, "operator notified of new lead");
        TriggerResponse::ok()
      }
      Err(e) => {
        tracing::error!(error = %e, "sending operator notification failed");
        TriggerResponse::failed(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use serde_json::json;

  use super::*;
  use crate::{Error, Result};

  #[derive(Default)]
  struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
  }

  impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
      if self.fail {
        return Err(Error::Config("smtp relay down".into()));
      }
      self.sent.lock().unwrap().push(email.clone());
      Ok(())
    }
  }

  fn function() -> NotificationFunction<RecordingMailer> {
    NotificationFunction::new(RecordingMailer::default(), "operator@example.com")
  }

  fn doc() -> Value {
    json!({
      "id": "7d3f",
      "email": "a@b.com",
      "message": "hi",
      "status": "new",
      "source": "website",
      "contact_date": "2024-03-07T09:05:02Z",
      "created_at": "2024-03-07T09:05:03Z"
    })
  }

  #[test]
  fn parses_direct_document() {
    let lead = parse_trigger(TriggerPayload::Document(doc())).unwrap();
    assert_eq!(lead.email, "a@b.com");
    assert_eq!(lead.contact_date.as_deref(), Some("2024-03-07T09:05:02Z"));
    assert_eq!(lead.created_at.as_deref(), Some("2024-03-07T09:05:03Z"));
  }

  #[test]
  fn parses_serialised_document() {
    let raw = doc().to_string();
    let lead = parse_trigger(TriggerPayload::Raw(raw)).unwrap();
    assert_eq!(lead.message, "hi");
  }

  #[test]
  fn unwraps_one_level_of_payload() {
    let wrapped = json!({ "payload": doc() });
    assert_eq!(
      parse_trigger(TriggerPayload::Document(wrapped)).unwrap().email,
      "a@b.com"
    );

    let wrapped_string = json!({ "payload": doc().to_string() }).to_string();
    assert_eq!(
      parse_trigger(TriggerPayload::Raw(wrapped_string)).unwrap().email,
      "a@b.com"
    );
  }

  #[test]
  fn parses_document_serialised_twice() {
    let twice = Value::String(doc().to_string());
    assert_eq!(
      parse_trigger(TriggerPayload::Document(twice.clone())).unwrap().email,
      "a@b.com"
    );
    assert_eq!(
      parse_trigger(TriggerPayload::Raw(twice.to_string())).unwrap().email,
      "a@b.com"
    );
  }

  #[test]
  fn accepts_camel_case_aliases() {
    let lead = parse_trigger(TriggerPayload::Document(json!({
      "email": "a@b.com",
      "message": "hi",
      "contactDate": "2024-01-01",
      "$createdAt": "2024-01-02"
    })))
    .unwrap();
    assert_eq!(lead.contact_date.as_deref(), Some("2024-01-01"));
    assert_eq!(lead.created_at.as_deref(), Some("2024-01-02"));
  }

  #[test]
  fn invalid_json_is_invalid_payload() {
    assert_eq!(
      parse_trigger(TriggerPayload::Raw("{not json".into())),
      Err(TriggerError::InvalidPayload)
    );
  }

  #[test]
  fn missing_fields_are_missing_lead_data() {
    for doc in [
      json!({ "email": "a@b.com" }),
      json!({ "payload": { "message": "hi" } }),
      json!({ "email": "", "message": "hi" }),
      json!(42),
      json!(null),
    ] {
      assert_eq!(
        parse_trigger(TriggerPayload::Document(doc.clone())),
        Err(TriggerError::MissingLeadData),
        "{doc}"
      );
    }
  }

  #[test]
  fn body_substitutes_absent_fields() {
    let lead = parse_trigger(TriggerPayload::Document(json!({
      "email": "a@b.com",
      "message": "hi"
    })))
    .unwrap();
    assert_eq!(lead.subject(), "New Lead from website");
    let body = lead.body();
    assert!(body.contains("- Status: unknown\n"));
    assert!(body.contains("- Source: unknown\n"));
    assert!(body.contains("- Contact Date: \n"));
    assert!(body.contains("- Created: "));
  }

  #[tokio::test]
  async fn sends_one_operator_email() {
    let f = function();
    let resp = f.handle(TriggerPayload::Document(doc())).await;

    assert_eq!(resp, TriggerResponse::ok());
    let sent = f.mailer().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "operator@example.com");
    assert_eq!(sent[0].subject, "New Lead from website");
    assert!(sent[0].body.contains("- Email: a@b.com\n"));
    assert!(sent[0].body.contains("- Created: 2024-03-07T09:05:03Z\n"));
  }

  #[tokio::test]
  async fn missing_message_reports_in_band() {
    let f = function();
    let resp = f
      .handle(TriggerPayload::Document(json!({ "email": "a@b.com" })))
      .await;

    assert_eq!(resp, TriggerResponse {
      success: false,
      error:   Some("Missing lead data".into()),
    });
    assert!(f.mailer().sent.lock().unwrap().is_empty());
    assert_eq!(
      serde_json::to_value(&resp).unwrap(),
      json!({ "success": false, "error": "Missing lead data" })
    );
  }

  #[tokio::test]
  async fn mailer_failure_reports_in_band() {
    let f = NotificationFunction::new(
      RecordingMailer { fail: true, ..Default::default() },
      "operator@example.com",
    );
    let resp = f.handle(TriggerPayload::Document(doc())).await;
    assert!(!resp.success);
    assert_eq!(
      resp.error.as_deref(),
      Some("mail transport misconfigured: smtp relay down")
    );
  }

  #[test]
  fn success_serialises_without_error_key() {
    assert_eq!(
      serde_json::to_value(TriggerResponse::ok()).unwrap(),
      json!({ "success": true })
    );
  }
}
