//! In-memory test doubles for the controllers.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::{SecondsFormat, Utc};
use leadline_core::{
  Lead, LeadField, LeadPatch, LeadStatus, LeadStore, NewLead, OrderSpec,
};
use leadline_notify::{Error as NotifyError, Mailer, OutgoingEmail};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("store unavailable")]
pub struct Unavailable;

/// A `Vec`-backed store that counts calls and can be switched to fail.
#[derive(Default)]
pub struct MemoryStore {
  leads:      Mutex<Vec<Lead>>,
  failing:    AtomicBool,
  calls:      AtomicUsize,
  list_calls: AtomicUsize,
}

impl MemoryStore {
  pub fn failing() -> Self {
    let store = Self::default();
    store.set_failing(true);
    store
  }

  pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  pub fn list_calls(&self) -> usize { self.list_calls.load(Ordering::SeqCst) }

  pub fn leads(&self) -> Vec<Lead> { self.leads.lock().unwrap().clone() }

  /// Seed a lead directly, bypassing the counters.
  pub fn insert(&self, email: &str, status: LeadStatus) -> Lead {
    let now = Utc::now();
    let lead = Lead {
      id: Uuid::new_v4(),
      created_at: now,
      updated_at: now,
      email: email.to_owned(),
      message: "hello".to_owned(),
      status,
      source: "website".to_owned(),
      contact_date: now,
    };
    self.leads.lock().unwrap().push(lead.clone());
    lead
  }

  fn enter(&self) -> Result<(), Unavailable> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.failing.load(Ordering::SeqCst) { Err(Unavailable) } else { Ok(()) }
  }
}

fn sort_key(lead: &Lead, field: LeadField) -> String {
  let ts = |t: chrono::DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Nanos, true);
  match field {
    LeadField::CreatedAt => ts(lead.created_at),
    LeadField::UpdatedAt => ts(lead.updated_at),
    LeadField::ContactDate => ts(lead.contact_date),
    LeadField::Email => lead.email.clone(),
    LeadField::Message => lead.message.clone(),
    LeadField::Status => lead.status.to_string(),
    LeadField::Source => lead.source.clone(),
  }
}

impl LeadStore for MemoryStore {
  type Error = Unavailable;

  async fn create(&self, input: NewLead) -> Result<Lead, Unavailable> {
    self.enter()?;
    let now = Utc::now();
    let lead = Lead {
      id: Uuid::new_v4(),
      created_at: now,
      updated_at: now,
      email: input.email,
      message: input.message,
      status: input.status,
      source: input.source,
      contact_date: input.contact_date,
    };
    self.leads.lock().unwrap().push(lead.clone());
    Ok(lead)
  }

  async fn list(&self, order: Option<OrderSpec>) -> Result<Vec<Lead>, Unavailable> {
    self.enter()?;
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    let mut leads = self.leads();
    if let Some(order) = order {
      // Stable sort, then reverse, keeps ties in insertion order per direction.
      leads.sort_by_key(|l| sort_key(l, order.field));
      if order.descending {
        leads.reverse();
      }
    }
    Ok(leads)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Lead>, Unavailable> {
    self.enter()?;
    Ok(self.leads().into_iter().find(|l| l.id == id))
  }

  async fn update(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>, Unavailable> {
    self.enter()?;
    let mut leads = self.leads.lock().unwrap();
    Ok(leads.iter_mut().find(|l| l.id == id).map(|lead| {
      patch.apply_to(lead);
      lead.updated_at = Utc::now();
      lead.clone()
    }))
  }

  async fn delete(&self, id: Uuid) -> Result<bool, Unavailable> {
    self.enter()?;
    let mut leads = self.leads.lock().unwrap();
    let before = leads.len();
    leads.retain(|l| l.id != id);
    Ok(leads.len() < before)
  }
}

/// Records every email it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
  sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
  pub fn sent(&self) -> Vec<OutgoingEmail> { self.sent.lock().unwrap().clone() }
}

impl Mailer for RecordingMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
    self.sent.lock().unwrap().push(email.clone());
    Ok(())
  }
}
