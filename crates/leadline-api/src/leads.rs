//! Handlers for `/leads` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leads` | Optional `?order=-createdDate` |
//! | `POST`   | `/leads` | Body: `{"email":..,"message":..}`; 201 |
//! | `GET`    | `/leads/:id` | 404 if not found |
//! | `PATCH`  | `/leads/:id` | Any subset of the writable fields |
//! | `DELETE` | `/leads/:id` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use leadline_core::{
  CreateLead, Error as CoreError, Lead, LeadPatch, LeadStatus, LeadStore,
  validate::{ValidationError, is_email_shaped, validate_submission},
};
use leadline_notify::Mailer;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn parse_status(status: Option<&str>) -> Result<Option<LeadStatus>, CoreError> {
  status.map(str::parse).transpose()
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(alias = "orderBy")]
  pub order: Option<String>,
}

/// `GET /leads[?order=<field>]`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Lead>>, ApiError>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  let leads = state.service.list(params.order.as_deref()).await?;
  Ok(Json(leads))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Missing `email` or `message` deserialise as empty and are rejected by
/// validation with a 400.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub email:        String,
  #[serde(default)]
  pub message:      String,
  pub status:       Option<String>,
  pub source:       Option<String>,
  pub contact_date: Option<DateTime<Utc>>,
}

/// `POST /leads`
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  validate_submission(&body.email, &body.message).map_err(CoreError::from)?;

  let input = CreateLead {
    email:        body.email.trim().to_owned(),
    message:      body.message,
    status:       parse_status(body.status.as_deref())?,
    source:       body.source,
    contact_date: body.contact_date.unwrap_or_else(Utc::now),
  };
  let lead = state.service.create(input).await?;
  state.spawn_create_trigger(&lead);
  Ok((StatusCode::CREATED, Json(lead)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Lead>, ApiError>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  Ok(Json(state.service.get(id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Status travels as a string so that an out-of-range value is a 400 from the
/// service rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub email:        Option<String>,
  pub message:      Option<String>,
  pub status:       Option<String>,
  pub source:       Option<String>,
  pub contact_date: Option<DateTime<Utc>>,
}

impl PatchBody {
  fn into_patch(self) -> Result<LeadPatch, CoreError> {
    if let Some(email) = &self.email
      && !is_email_shaped(email)
    {
      return Err(ValidationError::InvalidEmail(email.clone()).into());
    }
    Ok(LeadPatch {
      email:        self.email,
      message:      self.message,
      status:       parse_status(self.status.as_deref())?,
      source:       self.source,
      contact_date: self.contact_date,
    })
  }
}

/// `PATCH /leads/:id`
pub async fn update<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Lead>, ApiError>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  let patch = body.into_patch()?;
  Ok(Json(state.service.update(id, patch).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /leads/:id`
pub async fn delete<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  state.service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
