//! `POST /hooks/lead-created`: the notification function over HTTP.
//!
//! The body is handed over untouched as a raw payload, so both the bare
//! document and the `{"payload": ..}` envelope are accepted. A body that is
//! not UTF-8 is an invalid payload. The response is always `200` with
//! `{success, error?}`.

use axum::{Json, extract::State};
use bytes::Bytes;
use leadline_core::LeadStore;
use leadline_notify::{Mailer, TriggerError, TriggerPayload, TriggerResponse};

use crate::ApiState;

/// `POST /hooks/lead-created`
pub async fn lead_created<S, M>(
  State(state): State<ApiState<S, M>>,
  body: Bytes,
) -> Json<TriggerResponse>
where
  S: LeadStore + 'static,
  M: Mailer + 'static,
{
  let Ok(raw) = String::from_utf8(body.to_vec()) else {
    return Json(TriggerResponse::failed(TriggerError::InvalidPayload));
  };
  Json(state.notifier.handle(TriggerPayload::Raw(raw)).await)
}
