//! Best-effort notifications for newly created leads.
//!
//! Two delivery paths exist. The client-side [`Dispatcher`] fires a webhook
//! and an admin email once a lead is saved. The server-side
//! [`NotificationFunction`] is invoked by the backend's creation trigger and
//! re-sends an operator email. Neither path can fail the lead creation it
//! reports on.

pub mod dispatcher;
pub mod error;
pub mod mailer;
pub mod trigger;
pub mod webhook;

pub use dispatcher::{Dispatcher, LeadNotification};
pub use error::{Error, Result};
pub use mailer::{
  HttpMailer, LogMailer, MailConfig, MailTransport, Mailer, OutgoingEmail,
};
pub use trigger::{NotificationFunction, TriggerError, TriggerPayload, TriggerResponse};
pub use webhook::{Webhook, WebhookPayload};
