//! Handlers for `/programs` and `/cycles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/programs` | |
//! | `POST` | `/programs` | Body: [`ProgramInput`]; name unique case-insensitively |
//! | `GET` `PUT` `DELETE` | `/programs/{id}` | Delete cascades through cycles |
//! | `GET`  | `/programs/{id}/cycles` | |
//! | `POST` | `/programs/{id}/cycles` | Body: `{"start_year": 2025, "end_year": 2031}` |
//! | `GET` `PUT` `DELETE` | `/cycles/{id}` | |

use abet_core::{
  program::{Cycle, CycleInput, Program, ProgramInput},
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

const MSG_NAME_TAKEN: &str = "A program with this name already exists.";

// ─── Programs ─────────────────────────────────────────────────────────────────

/// `GET /programs`
pub async fn list<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Program>>, ApiError> {
  let programs = state.store.list_programs().await.map_err(ApiError::store)?;
  Ok(Json(programs))
}

async fn check_program<S: AccreditationStore>(
  store: &S,
  input: &mut ProgramInput,
  except: Option<i64>,
) -> Result<(), ApiError> {
  let mut errors = input.validate();
  if !input.program_name.is_empty()
    && store
      .program_name_taken(input.program_name.clone(), except)
      .await
      .map_err(ApiError::store)?
  {
    errors.add("program_name", MSG_NAME_TAKEN);
  }
  reject(errors)
}

/// `POST /programs`
pub async fn create<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Body(mut input): Body<ProgramInput>,
) -> Result<impl IntoResponse, ApiError> {
  check_program(state.store.as_ref(), &mut input, None).await?;
  let program = state.store.create_program(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(program)))
}

/// `GET /programs/{id}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Program>, ApiError> {
  let program = state
    .store
    .get_program(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("program", id))?;
  Ok(Json(program))
}

/// `PUT /programs/{id}`
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(mut input): Body<ProgramInput>,
) -> Result<Json<Program>, ApiError> {
  if state.store.get_program(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", id));
  }
  check_program(state.store.as_ref(), &mut input, Some(id)).await?;
  let program = state
    .store
    .update_program(id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("program", id))?;
  Ok(Json(program))
}

/// `DELETE /programs/{id}`
pub async fn delete<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_program(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("program", id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Cycles ───────────────────────────────────────────────────────────────────

/// `GET /programs/{id}/cycles`
pub async fn list_cycles<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
) -> Result<Json<Vec<Cycle>>, ApiError> {
  if state.store.get_program(program_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", program_id));
  }
  let cycles = state.store.list_cycles(program_id).await.map_err(ApiError::store)?;
  Ok(Json(cycles))
}

/// `POST /programs/{id}/cycles`
pub async fn create_cycle<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
  Body(input): Body<CycleInput>,
) -> Result<impl IntoResponse, ApiError> {
  let (start, end) = input.validate()?;
  let cycle = state
    .store
    .create_cycle(program_id, start, end)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("program", program_id))?;
  Ok((StatusCode::CREATED, Json(cycle)))
}

/// `GET /cycles/{id}`
pub async fn get_cycle<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Cycle>, ApiError> {
  let cycle = state
    .store
    .get_cycle(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", id))?;
  Ok(Json(cycle))
}

/// `PUT /cycles/{id}`: only the years are writable; progress is derived.
pub async fn update_cycle<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(input): Body<CycleInput>,
) -> Result<Json<Cycle>, ApiError> {
  let (start, end) = input.validate()?;
  let cycle = state
    .store
    .update_cycle(id, start, end)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("cycle", id))?;
  Ok(Json(cycle))
}

/// `DELETE /cycles/{id}`: removes the cycle's checklist, records, courses
/// and evidence with it.
pub async fn delete_cycle<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_cycle(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("cycle", id));
  }
  Ok(StatusCode::NO_CONTENT)
}
