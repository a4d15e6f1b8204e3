//! Handlers for evidence file metadata.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` `POST` | `/cycles/{id}/evidence` | Uploader is the authenticated user |
//! | `GET` `PUT` `DELETE` | `/evidence/{id}` | `upload_date` defaults to today, never in the future |

use abet_core::{
  evidence::{EvidenceFile, EvidenceInput},
  store::AccreditationStore,
};
use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;

use crate::{AppState, auth::CurrentUser, error::ApiError, extract::Body};

/// `GET /cycles/{id}/evidence`
pub async fn list<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(cycle_id): Path<i64>,
) -> Result<Json<Vec<EvidenceFile>>, ApiError> {
  if state.store.get_cycle(cycle_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("cycle", cycle_id));
  }
  let files = state.store.list_evidence(cycle_id).await.map_err(ApiError::store)?;
  Ok(Json(files))
}

/// `POST /cycles/{id}/evidence`
pub async fn create<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Extension(user): Extension<CurrentUser>,
  Path(cycle_id): Path<i64>,
  Body(input): Body<EvidenceInput>,
) -> Result<impl IntoResponse, ApiError> {
  let input = input.validate(Utc::now().date_naive())?;
  let file = state
    .store
    .create_evidence(cycle_id, user.user_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", cycle_id))?;
  Ok((StatusCode::CREATED, Json(file)))
}

/// `GET /evidence/{id}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<EvidenceFile>, ApiError> {
  let file = state
    .store
    .get_evidence(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("evidence file", id))?;
  Ok(Json(file))
}

/// `PUT /evidence/{id}`
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(input): Body<EvidenceInput>,
) -> Result<Json<EvidenceFile>, ApiError> {
  let input = input.validate(Utc::now().date_naive())?;
  let file = state
    .store
    .update_evidence(id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("evidence file", id))?;
  Ok(Json(file))
}

/// `DELETE /evidence/{id}`
pub async fn delete<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_evidence(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("evidence file", id));
  }
  Ok(StatusCode::NO_CONTENT)
}
