//! The client-side notification fan-out.
//!
//! After a lead is saved, [`Dispatcher::notify`] runs two legs side by side:
//! the automation webhook and the admin email. Each leg has its own error
//! boundary; a failure is logged at `warn` and goes no further. Nothing is
//! retried.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use leadline_core::lead::Lead;
use tokio::task::JoinHandle;

use crate::{
  mailer::{Mailer, OutgoingEmail},
  webhook::{Webhook, WebhookPayload, format_webhook_date},
};

/// Subject line of the admin email.
pub const ADMIN_EMAIL_SUBJECT: &str = "New Lead Submitted";

// ─── Notification ────────────────────────────────────────────────────────────

/// What the dispatcher needs to know about a freshly created lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadNotification {
  pub lead_id: String,
  pub email:   String,
  pub message: String,
  pub source:  String,
  /// Submission time, already in `yyyy-MM-dd HH:mm:ss` form.
  pub date:    String,
}

impl LeadNotification {
  /// Build from a lead, formatting `submitted_at` in local time.
  pub fn new(lead: &Lead, submitted_at: DateTime<Utc>) -> Self {
    Self {
      lead_id: lead.id.to_string(),
      email:   lead.email.clone(),
      message: lead.message.clone(),
      source:  lead.source.clone(),
      date:    format_webhook_date(&submitted_at.with_timezone(&Local)),
    }
  }

  pub fn webhook_payload(&self) -> WebhookPayload {
    WebhookPayload {
      email:   self.email.clone(),
      message: self.message.clone(),
      lead_id: self.lead_id.clone(),
      date:    self.date.clone(),
      source:  self.source.clone(),
    }
  }

  pub fn admin_email(&self, to: &str) -> OutgoingEmail {
    OutgoingEmail {
      to:      to.to_owned(),
      subject: ADMIN_EMAIL_SUBJECT.to_owned(),
      body:    format!(
        "New lead submitted:\n\nEmail: {}\nMessage: {}\nLead ID: {}\n\nSent from: {} contact form\n",
        self.email, self.message, self.lead_id, self.source,
      ),
    }
  }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Fans a [`LeadNotification`] out to the webhook and the admin inbox.
pub struct Dispatcher<M> {
  webhook:     Option<Webhook>,
  mailer:      M,
  admin_email: String,
}

impl<M: Mailer> Dispatcher<M> {
  /// `webhook` may be `None`, in which case that leg is skipped.
  pub fn new(webhook: Option<Webhook>, mailer: M, admin_email: impl Into<String>) -> Self {
    Self { webhook, mailer, admin_email: admin_email.into() }
  }

  pub fn mailer(&self) -> &M { &self.mailer }

  /// Run both legs concurrently. Never fails; leg errors are logged.
  pub async fn notify(&self, notification: &LeadNotification) {
    tokio::join!(
      self.webhook_leg(notification),
      self.email_leg(notification),
    );
  }

  async fn webhook_leg(&self, n: &LeadNotification) {
    let Some(webhook) = &self.webhook else {
      tracing::debug!(lead_id = %n.lead_id, "no webhook configured; skipping");
      return;
    };
    match webhook.post(&n.webhook_payload()).await {
      Ok(()) => tracing::info!(lead_id = %n.lead_id, date = %n.date, "webhook notification sent"),
      Err(e) => tracing::warn!(
        lead_id = %n.lead_id,
        error = %e,
        "webhook notification failed (lead still saved)"
      ),
    }
  }

  async fn email_leg(&self, n: &LeadNotification) {
    let email = n.admin_email(&self.admin_email);
    match self.mailer.send(&email).await {
      Ok(()) => tracing::info!(lead_id = %n.lead_id, to = %email.to, "admin email sent"),
      Err(e) => tracing::warn!(
        lead_id = %n.lead_id,
        error = %e,
        "admin email failed (lead still saved)"
      ),
    }
  }
}

impl<M: Mailer + 'static> Dispatcher<M> {
  /// Fire-and-forget: run [`Self::notify`] on a detached task.
  ///
  /// The handle is only for callers that must outlive the task (e.g. a CLI
  /// about to exit); dropping it does not cancel anything.
  pub fn spawn(self: &Arc<Self>, notification: LeadNotification) -> JoinHandle<()> {
    let this = Arc::clone(self);
    tokio::spawn(async move { this.notify(&notification).await })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use axum::{Json, Router, extract::State, routing::post};
  use chrono::Utc;
  use leadline_core::lead::LeadStatus;
  use tokio::net::TcpListener;
  use uuid::Uuid;

  use super::*;
  use crate::{Error, Result};

  /// Records every email; optionally fails after recording.
  #[derive(Default)]
  struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
  }

  impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
      self.sent.lock().unwrap().push(email.clone());
      if self.fail {
        Err(Error::Config("mailbox on fire".into()))
      } else {
        Ok(())
      }
    }
  }

  type Received = Arc<Mutex<Vec<serde_json::Value>>>;

  /// A local webhook sink that records JSON bodies.
  async fn webhook_sink() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
      .route(
        "/hook",
        post(|State(r): State<Received>, Json(body): Json<serde_json::Value>| async move {
          r.lock().unwrap().push(body);
          "Accepted"
        }),
      )
      .with_state(received.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/hook"), received)
  }

  /// A URL nothing listens on.
  async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/hook")
  }

  fn lead() -> Lead {
    let now = Utc::now();
    Lead {
      id:           Uuid::new_v4(),
      created_at:   now,
      updated_at:   now,
      email:        "a@b.com".into(),
      message:      "hi".into(),
      status:       LeadStatus::New,
      source:       "website".into(),
      contact_date: now,
    }
  }

  #[test]
  fn admin_email_lists_lead_fields() {
    let lead = lead();
    let email = LeadNotification::new(&lead, Utc::now()).admin_email("ops@example.com");
    assert_eq!(email.to, "ops@example.com");
    assert_eq!(email.subject, ADMIN_EMAIL_SUBJECT);
    assert!(email.body.contains("Email: a@b.com"));
    assert!(email.body.contains("Message: hi"));
    assert!(email.body.contains(&format!("Lead ID: {}", lead.id)));
    assert!(email.body.contains("Sent from: website contact form"));
  }

  #[tokio::test]
  async fn both_legs_deliver() {
    let (url, received) = webhook_sink().await;
    let dispatcher = Dispatcher::new(
      Some(Webhook::new(url).unwrap()),
      RecordingMailer::default(),
      "ops@example.com",
    );
    let lead = lead();
    let n = LeadNotification::new(&lead, Utc::now());

    dispatcher.notify(&n).await;

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["leadId"], lead.id.to_string());
    assert_eq!(bodies[0]["email"], "a@b.com");
    assert_eq!(bodies[0]["message"], "hi");
    assert_eq!(bodies[0]["source"], "website");
    assert_eq!(bodies[0]["date"], n.date);
    assert_eq!(dispatcher.mailer().sent.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn email_still_sent_when_webhook_fails() {
    let dispatcher = Dispatcher::new(
      Some(Webhook::new(dead_url().await).unwrap()),
      RecordingMailer::default(),
      "ops@example.com",
    );

    dispatcher.notify(&LeadNotification::new(&lead(), Utc::now())).await;

    let sent = dispatcher.mailer().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ops@example.com");
  }

  #[tokio::test]
  async fn webhook_still_fires_when_email_fails() {
    let (url, received) = webhook_sink().await;
    let dispatcher = Dispatcher::new(
      Some(Webhook::new(url).unwrap()),
      RecordingMailer { fail: true, ..Default::default() },
      "ops@example.com",
    );

    dispatcher.notify(&LeadNotification::new(&lead(), Utc::now())).await;

    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(dispatcher.mailer().sent.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn missing_webhook_skips_that_leg_only() {
    let dispatcher = Arc::new(Dispatcher::new(
      None,
      RecordingMailer::default(),
      "ops@example.com",
    ));

    dispatcher
      .spawn(LeadNotification::new(&lead(), Utc::now()))
      .await
      .unwrap();

    assert_eq!(dispatcher.mailer().sent.lock().unwrap().len(), 1);
  }
}
