//! Handlers for `/faculty` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` `POST` | `/faculty` | Email validated and unique; phone normalised |
//! | `GET` `PUT` `DELETE` | `/faculty/{id}` | Delete cascades through taught sections |
//! | `GET` `PUT` | `/faculty/{id}/profile` | Member, programs, dependent rows, taught sections |
//! | `PUT`  | `/faculty/{id}/programs` | Body: `{"program_ids": [..]}`; replaces assignments |

use std::collections::HashSet;

use abet_core::{
  FieldErrors,
  faculty::{FacultyInput, FacultyMember, FacultyProfile, FacultyProfileUpdate, ProgramAssignments},
  program::Program,
  store::AccreditationStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};

use crate::{
  AppState,
  error::{ApiError, reject},
  extract::Body,
};

const MSG_EMAIL_TAKEN: &str = "A faculty member with this email already exists.";

/// Validate `input` and check its email against every other member. Field
/// keys are prefixed with `prefix`.
async fn check_member<S: AccreditationStore>(
  store: &S,
  input: &mut FacultyInput,
  except: Option<i64>,
  prefix: &str,
) -> Result<FieldErrors, ApiError> {
  let mut errors = input.validate().prefixed(prefix);
  if !input.email.is_empty()
    && store
      .faculty_email_taken(input.email.clone(), except)
      .await
      .map_err(ApiError::store)?
  {
    errors.add(format!("{prefix}email"), MSG_EMAIL_TAKEN);
  }
  Ok(errors)
}

/// `GET /faculty`
pub async fn list<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<FacultyMember>>, ApiError> {
  let members = state.store.list_faculty().await.map_err(ApiError::store)?;
  Ok(Json(members))
}

/// `POST /faculty`
pub async fn create<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Body(mut input): Body<FacultyInput>,
) -> Result<impl IntoResponse, ApiError> {
  reject(check_member(state.store.as_ref(), &mut input, None, "").await?)?;
  let member = state.store.create_faculty(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /faculty/{id}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<FacultyMember>, ApiError> {
  let member = state
    .store
    .get_faculty(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("faculty member", id))?;
  Ok(Json(member))
}

/// `PUT /faculty/{id}`
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(mut input): Body<FacultyInput>,
) -> Result<Json<FacultyMember>, ApiError> {
  if state.store.get_faculty(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("faculty member", id));
  }
  reject(check_member(state.store.as_ref(), &mut input, Some(id), "").await?)?;
  let member = state
    .store
    .update_faculty(id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("faculty member", id))?;
  Ok(Json(member))
}

/// `DELETE /faculty/{id}`
pub async fn delete<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_faculty(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("faculty member", id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /faculty/{id}/profile`
pub async fn profile<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<FacultyProfile>, ApiError> {
  let profile = state
    .store
    .faculty_profile(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("faculty member", id))?;
  Ok(Json(profile))
}

/// `PUT /faculty/{id}/profile`: replaces every dependent row collection;
/// `member`, when present, replaces the member fields too.
pub async fn update_profile<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(mut body): Body<FacultyProfileUpdate>,
) -> Result<Json<FacultyProfile>, ApiError> {
  if state.store.get_faculty(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("faculty member", id));
  }
  let mut errors = match body.member.as_mut() {
    Some(member) => check_member(state.store.as_ref(), member, Some(id), "member.").await?,
    None => FieldErrors::new(),
  };
  errors.merge(body.records.validate());
  reject(errors)?;

  let profile = state
    .store
    .save_faculty_profile(id, body.member, body.records)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("faculty member", id))?;
  Ok(Json(profile))
}

/// `PUT /faculty/{id}/programs`
pub async fn replace_programs<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(body): Body<ProgramAssignments>,
) -> Result<Json<Vec<Program>>, ApiError> {
  let known: HashSet<i64> = state
    .store
    .list_programs()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|p| p.program_id)
    .collect();
  let mut errors = FieldErrors::new();
  for (i, program_id) in body.program_ids.iter().enumerate() {
    if !known.contains(program_id) {
      errors.add(format!("program_ids[{i}]"), format!("Unknown program {program_id}."));
    }
  }
  reject(errors)?;

  let programs = state
    .store
    .replace_faculty_programs(id, body.program_ids)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("faculty member", id))?;
  Ok(Json(programs))
}
