//! [`LeadService`]: the policy layer over a [`LeadStore`].
//!
//! Applies creation defaults (`status = new`, `source = website`), keeps
//! status values inside the enumeration, and reports missing ids as
//! [`Error::LeadNotFound`]. Store failures are logged and forwarded without
//! retry.

use uuid::Uuid;

use crate::{
  Error, Result,
  lead::{CreateLead, Lead, LeadPatch, LeadStatus},
  store::{LeadStore, OrderSpec},
};

fn store_error<E>(op: &'static str, e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tracing::error!(error = %e, "error {op} lead");
  Error::Store(Box::new(e))
}

/// Lead operations over an injected store.
pub struct LeadService<S> {
  store: S,
}

impl<S: LeadStore> LeadService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Persist a new lead, filling in the default status and source.
  pub async fn create(&self, input: CreateLead) -> Result<Lead> {
    let lead = self
      .store
      .create(input.into_new_lead())
      .await
      .map_err(|e| store_error("creating", e))?;
    tracing::info!(lead_id = %lead.id, source = %lead.source, "lead created");
    Ok(lead)
  }

  /// Every lead, ordered by `order` (e.g. `-createdDate`) when given.
  pub async fn list(&self, order: Option<&str>) -> Result<Vec<Lead>> {
    let order = order.map(str::parse::<OrderSpec>).transpose()?;
    self.list_ordered(order).await
  }

  pub async fn list_ordered(&self, order: Option<OrderSpec>) -> Result<Vec<Lead>> {
    self.store.list(order).await.map_err(|e| store_error("listing", e))
  }

  pub async fn get(&self, id: Uuid) -> Result<Lead> {
    self
      .store
      .get(id)
      .await
      .map_err(|e| store_error("getting", e))?
      .ok_or(Error::LeadNotFound(id))
  }

  /// Merge `patch` into the stored lead.
  pub async fn update(&self, id: Uuid, patch: LeadPatch) -> Result<Lead> {
    self
      .store
      .update(id, patch)
      .await
      .map_err(|e| store_error("updating", e))?
      .ok_or(Error::LeadNotFound(id))
  }

  /// Change only the status, given as its string form. Values outside the
  /// enumeration fail before the store is called.
  pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Lead> {
    let status: LeadStatus = status.parse()?;
    self.update(id, LeadPatch::status(status)).await
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let existed = self
      .store
      .delete(id)
      .await
      .map_err(|e| store_error("deleting", e))?;
    if existed {
      tracing::info!(lead_id = %id, "lead deleted");
      Ok(())
    } else {
      Err(Error::LeadNotFound(id))
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::Utc;

  use super::*;
  use crate::lead::NewLead;

  #[derive(Debug, thiserror::Error)]
  #[error("backend unavailable")]
  struct Unavailable;

  /// Vec-backed store that counts every call and can be switched to fail.
  #[derive(Default)]
  struct VecStore {
    leads:   Mutex<Vec<Lead>>,
    calls:   AtomicUsize,
    failing: bool,
  }

  impl VecStore {
    fn check(&self) -> Result<(), Unavailable> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.failing { Err(Unavailable) } else { Ok(()) }
    }
  }

  impl LeadStore for VecStore {
    type Error = Unavailable;

    async fn create(&self, input: NewLead) -> Result<Lead, Unavailable> {
      self.check()?;
      let now = Utc::now();
      let lead = Lead {
        id:           Uuid::new_v4(),
        created_at:   now,
        updated_at:   now,
        email:        input.email,
        message:      input.message,
        status:       input.status,
        source:       input.source,
        contact_date: input.contact_date,
      };
      self.leads.lock().unwrap().push(lead.clone());
      Ok(lead)
    }

    async fn list(&self, _order: Option<OrderSpec>) -> Result<Vec<Lead>, Unavailable> {
      self.check()?;
      Ok(self.leads.lock().unwrap().clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Lead>, Unavailable> {
      self.check()?;
      Ok(self.leads.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn update(
      &self,
      id: Uuid,
      patch: LeadPatch,
    ) -> Result<Option<Lead>, Unavailable> {
      self.check()?;
      let mut leads = self.leads.lock().unwrap();
      Ok(leads.iter_mut().find(|l| l.id == id).map(|lead| {
        patch.apply_to(lead);
        lead.updated_at = Utc::now();
        lead.clone()
      }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Unavailable> {
      self.check()?;
      let mut leads = self.leads.lock().unwrap();
      let before = leads.len();
      leads.retain(|l| l.id != id);
      Ok(leads.len() != before)
    }
  }

  fn submission() -> CreateLead { CreateLead::new("a@b.com", "hi", Utc::now()) }

  #[tokio::test]
  async fn create_defaults_status_and_source() {
    let service = LeadService::new(VecStore::default());
    let lead = service.create(submission()).await.unwrap();
    assert_eq!(lead.status, LeadStatus::New);
    assert_eq!(lead.source, "website");
  }

  #[tokio::test]
  async fn set_status_accepts_every_enumerated_value() {
    let service = LeadService::new(VecStore::default());
    let lead = service.create(submission()).await.unwrap();

    for status in LeadStatus::ALL {
      service.set_status(lead.id, status.as_str()).await.unwrap();
      assert_eq!(service.get(lead.id).await.unwrap().status, status);
    }
  }

  #[tokio::test]
  async fn set_status_rejects_unknown_values_before_the_store() {
    let service = LeadService::new(VecStore::default());
    let lead = service.create(submission()).await.unwrap();
    let calls = service.store().calls.load(Ordering::SeqCst);

    let err = service.set_status(lead.id, "archived").await.unwrap_err();

    assert!(matches!(err, Error::UnknownStatus(ref s) if s == "archived"));
    assert_eq!(service.store().calls.load(Ordering::SeqCst), calls);
  }

  #[tokio::test]
  async fn missing_ids_are_not_found() {
    let service = LeadService::new(VecStore::default());
    let id = Uuid::new_v4();

    assert!(service.get(id).await.unwrap_err().is_not_found());
    assert!(
      service
        .update(id, LeadPatch::status(LeadStatus::Closed))
        .await
        .unwrap_err()
        .is_not_found()
    );
    assert!(service.delete(id).await.unwrap_err().is_not_found());
  }

  #[tokio::test]
  async fn delete_then_get_is_not_found() {
    let service = LeadService::new(VecStore::default());
    let lead = service.create(submission()).await.unwrap();

    service.delete(lead.id).await.unwrap();

    assert!(service.get(lead.id).await.unwrap_err().is_not_found());
    assert!(service.list(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn store_failures_are_forwarded() {
    let service = LeadService::new(VecStore { failing: true, ..Default::default() });
    let err = service.create(submission()).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.to_string(), "store error: backend unavailable");
  }

  #[tokio::test]
  async fn list_rejects_unknown_order_fields() {
    let service = LeadService::new(VecStore::default());
    let err = service.list(Some("-priority")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOrderField(_)));
    assert_eq!(service.store().calls.load(Ordering::SeqCst), 0);
  }
}
