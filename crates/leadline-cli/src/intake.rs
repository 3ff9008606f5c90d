//! The intake form controller.
//!
//! States: `Idle → Sending → {Succeeded, Failed} → Idle`. A successful
//! submission clears the fields, hands the lead to the notification
//! dispatcher, and shows success for [`SUCCESS_WINDOW`]; a failed one keeps
//! the fields for a resubmit and dispatches nothing.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use leadline_core::{
  CreateLead, LeadService, LeadStore,
  validate::{ValidationError, validate_submission},
};
use leadline_notify::{Dispatcher, LeadNotification, Mailer};
use tokio::{task::JoinHandle, time::Instant};

/// How long the success state is shown before the form resets.
pub const SUCCESS_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
  Idle,
  Sending,
  Succeeded,
  Failed,
}

pub struct IntakeForm<S, M> {
  pub email:   String,
  pub message: String,

  service:    LeadService<S>,
  dispatcher: Arc<Dispatcher<M>>,
  /// Label sent as the lead's `source`.
  source:     String,

  state:         FormState,
  success_until: Option<Instant>,
  last_error:    Option<String>,
  /// Dispatches still in flight.
  pending:       Vec<JoinHandle<()>>,
}

impl<S, M> IntakeForm<S, M>
where
  S: LeadStore,
  M: Mailer + 'static,
{
  pub fn new(
    service: LeadService<S>,
    dispatcher: Dispatcher<M>,
    source: impl Into<String>,
  ) -> Self {
    Self {
      email: String::new(),
      message: String::new(),
      service,
      dispatcher: Arc::new(dispatcher),
      source: source.into(),
      state: FormState::Idle,
      success_until: None,
      last_error: None,
      pending: Vec::new(),
    }
  }

  #[cfg(test)]
  pub fn service(&self) -> &LeadService<S> { &self.service }

  #[cfg(test)]
  pub fn dispatcher(&self) -> &Dispatcher<M> { &self.dispatcher }

  /// The current state. `Succeeded` reads as `Idle` once the success window
  /// has elapsed.
  pub fn state(&self) -> FormState {
    match (self.state, self.success_until) {
      (FormState::Succeeded, Some(until)) if Instant::now() >= until => FormState::Idle,
      (state, _) => state,
    }
  }

  /// The message behind the last `Failed` state. Cleared by the next attempt.
  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  /// Submit the current fields.
  ///
  /// A validation failure returns `Err` without touching the state or the
  /// network. Otherwise the resulting state is returned.
  pub async fn submit(&mut self) -> Result<FormState, ValidationError> {
    validate_submission(&self.email, &self.message)?;

    self.state = FormState::Sending;
    self.last_error = None;
    self.success_until = None;

    let submitted_at = Utc::now();
    let input = CreateLead {
      source: Some(self.source.clone()),
      ..CreateLead::new(self.email.trim(), self.message.clone(), submitted_at)
    };

    match self.service.create(input).await {
      Ok(lead) => {
        let notification = LeadNotification::new(&lead, submitted_at);
        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(self.dispatcher.spawn(notification));

        self.email.clear();
        self.message.clear();
        self.state = FormState::Succeeded;
        self.success_until = Some(Instant::now() + SUCCESS_WINDOW);
      }
      Err(e) => {
        tracing::error!(error = %e, "lead submission failed");
        self.state = FormState::Failed;
        self.last_error = Some(e.to_string());
      }
    }
    Ok(self.state)
  }

  /// Wait for every dispatched notification to finish.
  pub async fn flush_notifications(&mut self) {
    for handle in self.pending.drain(..) {
      if let Err(e) = handle.await {
        tracing::warn!(error = %e, "notification task did not complete");
      }
    }
  }
}
