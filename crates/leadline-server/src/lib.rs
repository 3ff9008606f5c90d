//! HTTP server wiring for leadline.
//!
//! Mounts the [`leadline_api`] router behind a request-tracing layer and owns
//! the server's runtime configuration.

use std::path::PathBuf;

use axum::Router;
use leadline_api::{ApiState, api_router};
use leadline_core::LeadStore;
use leadline_notify::{MailConfig, MailTransport, Mailer, NotificationFunction};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `leadline.toml` and
/// `LEADLINE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// Recipient of the server-side "New Lead Alert!" email.
  #[serde(default = "default_operator_email")]
  pub operator_email:    String,
  #[serde(default = "default_true")]
  pub on_create_trigger: bool,
  #[serde(default)]
  pub mail:              MailConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/leadline/leads.db") }
fn default_operator_email() -> String { "operator@example.com".to_string() }
fn default_true() -> bool { true }

impl ServerConfig {
  /// The notification function configured by `mail` and `operator_email`.
  pub fn notifier(&self) -> leadline_notify::Result<NotificationFunction<MailTransport>> {
    let transport = MailTransport::from_config(&self.mail)?;
    Ok(NotificationFunction::new(transport, self.operator_email.clone()))
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn app<S, M>(state: ApiState<S, M>) -> Router
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
