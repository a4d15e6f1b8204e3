//! Handlers for checklist items and the per-cycle checklist aggregate.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cycles/{id}/checklist` | Ensures default items, stores progress |
//! | `GET`  | `/checklist-items` | Optional `?cycle_id=` |
//! | `POST` | `/checklist-items` | Body: [`NewChecklistItem`]; slot inferred from the name if absent |
//! | `GET` `PUT` `DELETE` | `/checklist-items/{id}` | `status` always follows the percentage |

use abet_core::{
  FieldErrors,
  checklist::{ChecklistItem, ChecklistItemUpdate, ChecklistView, NewChecklistItem},
  store::AccreditationStore,
  validate,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, reject},
  extract::Body,
};

/// `GET /cycles/{id}/checklist`
pub async fn cycle_checklist<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(cycle_id): Path<i64>,
) -> Result<Json<ChecklistView>, ApiError> {
  let view = state
    .store
    .cycle_checklist(cycle_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", cycle_id))?;
  Ok(Json(view))
}

// ─── Items ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub cycle_id: Option<i64>,
}

/// `GET /checklist-items[?cycle_id=<id>]`
pub async fn list<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ChecklistItem>>, ApiError> {
  let items = state
    .store
    .list_checklist_items(params.cycle_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `POST /checklist-items`
pub async fn create<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Body(mut input): Body<NewChecklistItem>,
) -> Result<impl IntoResponse, ApiError> {
  let mut errors = FieldErrors::new();
  input.item_name = input.item_name.trim().to_string();
  validate::required(&mut errors, "item_name", &input.item_name);
  validate::percentage(&mut errors, "completion_percentage", input.completion_percentage);
  reject(errors)?;

  let cycle_id = input.cycle_id;
  let item = state
    .store
    .create_checklist_item(input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::Validation(FieldErrors::single("cycle_id", format!("Unknown cycle {cycle_id}.")))
    })?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /checklist-items/{id}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<ChecklistItem>, ApiError> {
  let item = state
    .store
    .get_checklist_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("checklist item", id))?;
  Ok(Json(item))
}

/// `PUT /checklist-items/{id}`
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(mut update): Body<ChecklistItemUpdate>,
) -> Result<Json<ChecklistItem>, ApiError> {
  let mut errors = FieldErrors::new();
  if let Some(name) = update.item_name.as_mut() {
    *name = name.trim().to_string();
    validate::required(&mut errors, "item_name", name);
  }
  if let Some(p) = update.completion_percentage {
    validate::percentage(&mut errors, "completion_percentage", p);
  }
  reject(errors)?;

  let item = state
    .store
    .update_checklist_item(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("checklist item", id))?;
  Ok(Json(item))
}

/// `DELETE /checklist-items/{id}`
pub async fn delete<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_checklist_item(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("checklist item", id));
  }
  Ok(StatusCode::NO_CONTENT)
}
