//! The admin panel controller.
//!
//! Holds a client-side cache of every lead, loaded once newest-first. After a
//! successful status change or delete the cache is patched in place
//! ([`AdminPanel::apply_status`], [`AdminPanel::evict`]) rather than
//! re-fetched, so it can drift from the store under concurrent writers until
//! the next [`AdminPanel::load`].

use std::{fmt, str::FromStr};

use leadline_core::{Error, Lead, LeadPatch, LeadService, LeadStatus, LeadStore, OrderSpec};
use uuid::Uuid;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Which rows the lead table shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
  #[default]
  All,
  Only(LeadStatus),
}

impl StatusFilter {
  pub fn matches(self, lead: &Lead) -> bool {
    match self {
      Self::All => true,
      Self::Only(status) => lead.status == status,
    }
  }
}

impl FromStr for StatusFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "all" => Ok(Self::All),
      other => Ok(Self::Only(other.parse()?)),
    }
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("all"),
      Self::Only(status) => write!(f, "{status}"),
    }
  }
}

// ─── Panel ───────────────────────────────────────────────────────────────────

pub struct AdminPanel<S> {
  service: LeadService<S>,

  /// Every lead, newest first.
  pub leads:         Vec<Lead>,
  pub is_loading:    bool,
  /// The lead open in the detail view.
  pub selected:      Option<Lead>,
  /// Chosen for deletion and awaiting confirmation.
  pub delete_target: Option<Uuid>,
  pub filter:        StatusFilter,
}

impl<S: LeadStore> AdminPanel<S> {
  pub fn new(service: LeadService<S>) -> Self {
    Self {
      service,
      leads: Vec::new(),
      is_loading: false,
      selected: None,
      delete_target: None,
      filter: StatusFilter::All,
    }
  }

  #[cfg(test)]
  pub fn service(&self) -> &LeadService<S> { &self.service }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch every lead newest-first. On failure the cache keeps whatever it
  /// held before and the error is only logged.
  pub async fn load(&mut self) {
    self.is_loading = true;
    match self.service.list_ordered(Some(OrderSpec::newest_first())).await {
      Ok(leads) => self.leads = leads,
      Err(e) => tracing::error!(error = %e, "failed to load leads"),
    }
    self.is_loading = false;
  }

  /// Cached leads passing the current filter. Never touches the store.
  pub fn filtered(&self) -> Vec<&Lead> {
    self.leads.iter().filter(|l| self.filter.matches(l)).collect()
  }

  // ── Detail view ───────────────────────────────────────────────────────────

  /// Open `id` in the detail view. Returns `None` if it is not cached.
  pub fn select(&mut self, id: Uuid) -> Option<&Lead> {
    self.selected = self.leads.iter().find(|l| l.id == id).cloned();
    self.selected.as_ref()
  }

  // ── Status ────────────────────────────────────────────────────────────────

  /// Change a lead's status in the store, then patch the cache and the open
  /// detail view. Returns the stored lead, or `None` if the change failed.
  pub async fn update_status(&mut self, id: Uuid, status: LeadStatus) -> Option<Lead> {
    match self.service.update(id, LeadPatch::status(status)).await {
      Ok(lead) => {
        self.apply_status(id, status);
        Some(lead)
      }
      Err(e) => {
        tracing::error!(lead_id = %id, error = %e, "failed to update lead status");
        None
      }
    }
  }

  /// Cache step for a status change already accepted by the store.
  pub fn apply_status(&mut self, id: Uuid, status: LeadStatus) {
    if let Some(lead) = self.leads.iter_mut().find(|l| l.id == id) {
      lead.status = status;
    }
    if let Some(lead) = self.selected.as_mut().filter(|l| l.id == id) {
      lead.status = status;
    }
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// First step of a delete: choose the target.
  pub fn request_delete(&mut self, id: Uuid) { self.delete_target = Some(id); }

  pub fn cancel_delete(&mut self) { self.delete_target = None; }

  /// Second step: delete the chosen target. Returns whether a lead was
  /// removed; on failure everything is left as it was.
  pub async fn confirm_delete(&mut self) -> bool {
    let Some(id) = self.delete_target else {
      return false;
    };
    match self.service.delete(id).await {
      Ok(()) => {
        self.evict(id);
        self.delete_target = None;
        true
      }
      Err(e) => {
        tracing::error!(lead_id = %id, error = %e, "failed to delete lead");
        false
      }
    }
  }

  /// Cache step for a delete already accepted by the store.
  pub fn evict(&mut self, id: Uuid) {
    self.leads.retain(|l| l.id != id);
    if self.selected.as_ref().is_some_and(|l| l.id == id) {
      self.selected = None;
    }
  }
}
