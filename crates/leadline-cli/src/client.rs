//! Async HTTP client wrapping the leadline JSON API.
//!
//! [`ApiClient`] is the client-side [`LeadStore`]: the controllers talk to a
//! [`leadline_core::LeadService`] over it exactly as the server does over
//! SQLite.

use leadline_core::{Lead, LeadPatch, LeadStore, NewLead, OrderSpec};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  &'static str,
    path:    String,
    status:  StatusCode,
    message: String,
  },
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Connection settings for the leadline API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the leadline JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder().build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Pass a success through; turn anything else into [`ClientError::Status`]
  /// carrying the API's `{"error": ..}` message when there is one.
  async fn check(
    method: &'static str,
    path: String,
    resp: Response,
  ) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
      .map(|b| b.error)
      .unwrap_or(text);
    Err(ClientError::Status { method, path, status, message })
  }
}

impl LeadStore for ApiClient {
  type Error = ClientError;

  /// `POST /leads`
  async fn create(&self, input: NewLead) -> Result<Lead, ClientError> {
    let body = json!({
      "email":        input.email,
      "message":      input.message,
      "status":       input.status,
      "source":       input.source,
      "contact_date": input.contact_date,
    });
    let resp = self.client.post(self.url("/leads")).json(&body).send().await?;
    let resp = Self::check("POST", "/leads".into(), resp).await?;
    Ok(resp.json().await?)
  }

  /// `GET /leads[?order=<spec>]`
  async fn list(&self, order: Option<OrderSpec>) -> Result<Vec<Lead>, ClientError> {
    let mut req = self.client.get(self.url("/leads"));
    if let Some(order) = order {
      req = req.query(&[("order", order.to_string())]);
    }
    let resp = Self::check("GET", "/leads".into(), req.send().await?).await?;
    Ok(resp.json().await?)
  }

  /// `GET /leads/:id`
  async fn get(&self, id: Uuid) -> Result<Option<Lead>, ClientError> {
    let path = format!("/leads/{id}");
    let resp = self.client.get(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = Self::check("GET", path, resp).await?;
    Ok(Some(resp.json().await?))
  }

  /// `PATCH /leads/:id`
  async fn update(
    &self,
    id: Uuid,
    patch: LeadPatch,
  ) -> Result<Option<Lead>, ClientError> {
    let path = format!("/leads/{id}");
    let resp = self.client.patch(self.url(&path)).json(&patch).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = Self::check("PATCH", path, resp).await?;
    Ok(Some(resp.json().await?))
  }

  /// `DELETE /leads/:id`
  async fn delete(&self, id: Uuid) -> Result<bool, ClientError> {
    let path = format!("/leads/{id}");
    let resp = self.client.delete(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    Self::check("DELETE", path, resp).await?;
    Ok(true)
  }
}
