//! JSON REST API for leadline.
//!
//! Exposes an axum [`Router`] over a [`LeadService`] and the server-side
//! [`NotificationFunction`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(leadline_api::api_router(state))
//! ```

pub mod error;
pub mod hooks;
pub mod leads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use leadline_core::{Lead, LeadService, LeadStore};
use leadline_notify::{Mailer, NotificationFunction, TriggerPayload};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, M> {
  pub service:           Arc<LeadService<S>>,
  pub notifier:          Arc<NotificationFunction<M>>,
  /// Run `notifier` in the background after every successful create.
  pub trigger_on_create: bool,
}

impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self {
      service:           Arc::clone(&self.service),
      notifier:          Arc::clone(&self.notifier),
      trigger_on_create: self.trigger_on_create,
    }
  }
}

impl<S, M> ApiState<S, M>
where
  S: LeadStore,
  M: Mailer + 'static,
{
  pub fn new(service: LeadService<S>, notifier: NotificationFunction<M>) -> Self {
    Self {
      service:           Arc::new(service),
      notifier:          Arc::new(notifier),
      trigger_on_create: true,
    }
  }

  pub fn with_trigger_on_create(mut self, enabled: bool) -> Self {
    self.trigger_on_create = enabled;
    self
  }

  /// Hand the created document to the notification function on a detached
  /// task. The outcome is only logged.
  fn spawn_create_trigger(&self, lead: &Lead) {
    if !self.trigger_on_create {
      return;
    }
    let payload = match serde_json::to_value(lead) {
      Ok(doc) => TriggerPayload::Document(doc),
      Err(e) => {
        tracing::warn!(lead_id = %lead.id, error = %e, "could not encode lead for trigger");
        return;
      }
    };
    let notifier = Arc::clone(&self.notifier);
    let lead_id = lead.id;
    tokio::spawn(async move {
      let response = notifier.handle(payload).await;
      if let Some(error) = response.error {
        tracing::warn!(%lead_id, %error, "on-create notification failed");
      }
    });
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router over `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>) -> Router<()>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    .route("/leads", get(leads::list::<S, M>).post(leads::create::<S, M>))
    .route(
      "/leads/{id}",
      get(leads::get_one::<S, M>)
        .patch(leads::update::<S, M>)
        .delete(leads::delete::<S, M>),
    )
    .route("/hooks/lead-created", post(hooks::lead_created::<S, M>))
    .with_state(state)
}
