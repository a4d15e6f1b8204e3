//! Handlers for the per-cycle section records.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cycles/{id}/{section}` | Auto-creates an empty record on first read |
//! | `PUT`  | `/cycles/{id}/{section}` | Partial body over the stored record; a listed collection replaces its rows |
//!
//! `section` is one of `background`, `criterion1` … `criterion8`,
//! `appendixa` … `appendixd`. The response is
//! `{"record": {...}, "<collection>": [...], "checklist_item_id": n}`.

use std::str::FromStr as _;

use abet_core::{
  section::{Section, SectionPayload},
  store::AccreditationStore,
};
use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use serde_json::Value;

use crate::{
  AppState,
  error::{ApiError, reject},
  extract::Body,
};

fn parse_section(tag: &str) -> Result<Section, ApiError> {
  Section::from_str(tag).map_err(|_| ApiError::NotFound(format!("unknown section {tag:?}")))
}

/// `GET /cycles/{id}/{section}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((cycle_id, tag)): Path<(i64, String)>,
) -> Result<Json<Value>, ApiError> {
  let section = parse_section(&tag)?;
  let view = state
    .store
    .section_view(cycle_id, section)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", cycle_id))?;
  Ok(Json(view.to_wire()?))
}

/// `PUT /cycles/{id}/{section}`
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((cycle_id, tag)): Path<(i64, String)>,
  Body(body): Body<Value>,
) -> Result<Json<Value>, ApiError> {
  let section = parse_section(&tag)?;
  let current = state
    .store
    .section_view(cycle_id, section)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", cycle_id))?;

  let mut payload = SectionPayload::from_view(&current).apply_json(body)?;
  reject(payload.validate(Utc::now().date_naive()))?;

  let view = state
    .store
    .save_section(cycle_id, payload)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", cycle_id))?;
  Ok(Json(view.to_wire()?))
}
