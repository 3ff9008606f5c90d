//! `leadline`: command-line intake form and admin panel for leadline.
//!
//! # Usage
//!
//! ```
//! leadline submit --email a@b.com --message "Call me back"
//! leadline leads --status contacted
//! leadline set-status 7d3f… qualified
//! leadline --config ~/.config/leadline/config.toml delete 7d3f…
//! ```

mod admin;
mod client;
mod intake;
#[cfg(test)]
mod testing;

use std::io::{self, BufRead, Write};

use admin::{AdminPanel, StatusFilter};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use intake::{FormState, IntakeForm};
use leadline_core::{Lead, LeadService, LeadStatus};
use leadline_notify::{Dispatcher, MailConfig, MailTransport, Webhook};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "leadline", about = "Submit and manage leads")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the leadline server (default: http://localhost:8080).
  #[arg(long, env = "LEADLINE_URL")]
  url: Option<String>,

  /// Automation endpoint notified after each submission.
  #[arg(long, env = "LEADLINE_WEBHOOK_URL")]
  webhook_url: Option<String>,

  /// Recipient of the "New Lead Submitted" email.
  #[arg(long, env = "LEADLINE_ADMIN_EMAIL")]
  admin_email: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Submit a lead through the intake form.
  Submit {
    #[arg(long)]
    email:   String,
    #[arg(long)]
    message: String,
  },
  /// List leads, newest first.
  Leads {
    /// `all` or one of new, contacted, qualified, converted, closed.
    #[arg(long, default_value = "all")]
    status: StatusFilter,
  },
  /// Show one lead in detail.
  Show { id: Uuid },
  /// Change a lead's status.
  SetStatus { id: Uuid, status: LeadStatus },
  /// Delete a lead after confirmation.
  Delete {
    id: Uuid,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
  },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:         String,
  #[serde(default)]
  webhook_url: String,
  #[serde(default)]
  admin_email: String,
  #[serde(default)]
  source:      String,
  #[serde(default)]
  mail:        MailConfig,
}

/// Prefer the flag, then a non-empty file value, then the default.
fn pick(flag: Option<String>, file: &str, default: &str) -> String {
  flag
    .or_else(|| (!file.is_empty()).then(|| file.to_owned()))
    .unwrap_or_else(|| default.to_owned())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: pick(args.url, &file_cfg.url, "http://localhost:8080"),
  };
  let client = ApiClient::new(api_config).context("building HTTP client")?;
  let service = LeadService::new(client);

  match args.command {
    Command::Submit { email, message } => {
      let webhook_url = pick(args.webhook_url, &file_cfg.webhook_url, "");
      let webhook = if webhook_url.is_empty() {
        None
      } else {
        Some(Webhook::new(webhook_url).context("building webhook client")?)
      };
      let mailer =
        MailTransport::from_config(&file_cfg.mail).context("configuring mail transport")?;
      let admin_email = pick(args.admin_email, &file_cfg.admin_email, "contact@example.com");
      let source = pick(None, &file_cfg.source, leadline_core::lead::DEFAULT_SOURCE);

      let dispatcher = Dispatcher::new(webhook, mailer, admin_email);
      let mut form = IntakeForm::new(service, dispatcher, source);
      form.email = email;
      form.message = message;
      submit(&mut form).await
    }

    Command::Leads { status } => {
      let mut panel = load_panel(service).await;
      panel.filter = status;
      let rows = panel.filtered();
      for lead in &rows {
        print_row(lead);
      }
      eprintln!("{} of {} leads ({})", rows.len(), panel.leads.len(), panel.filter);
      Ok(())
    }

    Command::Show { id } => {
      let mut panel = load_panel(service).await;
      let lead = panel.select(id).ok_or_else(|| anyhow!("lead {id} not found"))?;
      print_detail(lead);
      Ok(())
    }

    Command::SetStatus { id, status } => {
      let mut panel = load_panel(service).await;
      panel
        .select(id)
        .ok_or_else(|| anyhow!("lead {id} not found"))?;
      panel
        .update_status(id, status)
        .await
        .ok_or_else(|| anyhow!("failed to update lead {id}"))?;
      if let Some(lead) = &panel.selected {
        print_detail(lead);
      }
      Ok(())
    }

    Command::Delete { id, yes } => {
      let mut panel = load_panel(service).await;
      let lead = panel
        .select(id)
        .cloned()
        .ok_or_else(|| anyhow!("lead {id} not found"))?;
      panel.request_delete(id);

      if !yes && !confirm(&lead)? {
        panel.cancel_delete();
        eprintln!("cancelled");
        return Ok(());
      }
      if !panel.confirm_delete().await {
        bail!("failed to delete lead {id}");
      }
      eprintln!("deleted {id}");
      Ok(())
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn submit(form: &mut IntakeForm<ApiClient, MailTransport>) -> Result<()> {
  form.submit().await.context("invalid submission")?;
  let state = form.state();
  // Notifications run in the background; let them finish before exiting.
  form.flush_notifications().await;
  match state {
    FormState::Succeeded => {
      println!("Thank you! Your message has been sent.");
      Ok(())
    }
    _ => bail!(
      "submission failed: {}",
      form.last_error().unwrap_or("unknown error")
    ),
  }
}

async fn load_panel(service: LeadService<ApiClient>) -> AdminPanel<ApiClient> {
  let mut panel = AdminPanel::new(service);
  panel.load().await;
  panel
}

/// Ask on stdin whether `lead` should really be deleted.
fn confirm(lead: &Lead) -> Result<bool> {
  print!("Delete lead {} <{}>? [y/N] ", lead.id, lead.email);
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn print_row(lead: &Lead) {
  println!(
    "{}  {:<10} {:<30} {}",
    lead.id,
    lead.status.as_str(),
    lead.email,
    lead.created_at.format("%Y-%m-%d %H:%M"),
  );
}

fn print_detail(lead: &Lead) {
  println!("id:           {}", lead.id);
  println!("email:        {}", lead.email);
  println!("status:       {}", lead.status);
  println!("source:       {}", lead.source);
  println!("contact date: {}", lead.contact_date.to_rfc3339());
  println!("created:      {}", lead.created_at.to_rfc3339());
  println!("updated:      {}", lead.updated_at.to_rfc3339());
  println!();
  println!("{}", lead.message);
}
