//! Handlers for student outcomes, PEOs, CLOs and the mappings between them.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` `POST` | `/programs/{id}/student-outcomes` | Body: `{"code": "...", "description": "..."}` |
//! | `GET` `PUT` `DELETE` | `/student-outcomes/{id}` | |
//! | `GET` `POST` | `/programs/{id}/peos` | |
//! | `GET` `PUT` `DELETE` | `/peos/{id}` | |
//! | `GET` `POST` | `/courses/{id}/clos` | |
//! | `GET` `PUT` `DELETE` | `/clos/{id}` | |
//! | `GET` `PUT` | `/programs/{id}/so-peo-mappings` | Body: `{"mappings": [{"so_id", "peo_id"}]}` |
//! | `GET` `PUT` | `/courses/{id}/clo-so-mappings` | Body: `{"mappings": [{"clo_id", "so_id"}]}` |
//!
//! Mapping writes replace the whole set. Every referenced id must belong to
//! the owning program (or course); duplicates are collapsed.

use std::collections::HashSet;

use abet_core::{
  outcome::{CloSoMapping, MappingSet, Outcome, OutcomeInput, OutcomeKind, SoPeoMapping, check_pairs},
  store::AccreditationStore,
};
use axum::{
  Json, Router,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};

use crate::{
  AppState,
  error::{ApiError, reject},
  extract::Body,
};

/// Resource routes for all three outcome kinds.
pub fn routes<S: AccreditationStore + 'static>() -> Router<AppState<S>> {
  Router::new()
    .merge(kind_routes::<S>(
      OutcomeKind::So,
      "/programs/{id}/student-outcomes",
      "/student-outcomes/{id}",
    ))
    .merge(kind_routes::<S>(OutcomeKind::Peo, "/programs/{id}/peos", "/peos/{id}"))
    .merge(kind_routes::<S>(OutcomeKind::Clo, "/courses/{id}/clos", "/clos/{id}"))
}

fn kind_routes<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  owned: &str,
  single: &str,
) -> Router<AppState<S>> {
  Router::new()
    .route(
      owned,
      get(move |state: State<AppState<S>>, path: Path<i64>| list(kind, state, path)).post(
        move |state: State<AppState<S>>, path: Path<i64>, body: Body<OutcomeInput>| {
          create(kind, state, path, body)
        },
      ),
    )
    .route(
      single,
      get(move |state: State<AppState<S>>, path: Path<i64>| get_one(kind, state, path))
        .put(
          move |state: State<AppState<S>>, path: Path<i64>, body: Body<OutcomeInput>| {
            update(kind, state, path, body)
          },
        )
        .delete(move |state: State<AppState<S>>, path: Path<i64>| delete(kind, state, path)),
    )
}

async fn owner_exists<S: AccreditationStore>(
  store: &S,
  kind: OutcomeKind,
  owner_id: i64,
) -> Result<bool, ApiError> {
  Ok(match kind {
    OutcomeKind::So | OutcomeKind::Peo => {
      store.get_program(owner_id).await.map_err(ApiError::store)?.is_some()
    }
    OutcomeKind::Clo => store.get_course(owner_id).await.map_err(ApiError::store)?.is_some(),
  })
}

fn owner_missing(kind: OutcomeKind, owner_id: i64) -> ApiError {
  match kind {
    OutcomeKind::Clo => ApiError::not_found("course", owner_id),
    _ => ApiError::not_found("program", owner_id),
  }
}

async fn ids_of<S: AccreditationStore>(
  store: &S,
  kind: OutcomeKind,
  owner_id: i64,
) -> Result<HashSet<i64>, ApiError> {
  Ok(
    store
      .list_outcomes(kind, owner_id)
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .map(|o| o.outcome_id)
      .collect(),
  )
}

// ─── Outcomes ─────────────────────────────────────────────────────────────────

async fn list<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  State(state): State<AppState<S>>,
  Path(owner_id): Path<i64>,
) -> Result<Json<Vec<Outcome>>, ApiError> {
  if !owner_exists(state.store.as_ref(), kind, owner_id).await? {
    return Err(owner_missing(kind, owner_id));
  }
  let outcomes = state.store.list_outcomes(kind, owner_id).await.map_err(ApiError::store)?;
  Ok(Json(outcomes))
}

async fn create<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  State(state): State<AppState<S>>,
  Path(owner_id): Path<i64>,
  Body(mut input): Body<OutcomeInput>,
) -> Result<impl IntoResponse, ApiError> {
  reject(input.validate())?;
  let outcome = state
    .store
    .create_outcome(kind, owner_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| owner_missing(kind, owner_id))?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_one<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Outcome>, ApiError> {
  let outcome = state
    .store
    .get_outcome(kind, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found(kind.label(), id))?;
  Ok(Json(outcome))
}

async fn update<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Body(mut input): Body<OutcomeInput>,
) -> Result<Json<Outcome>, ApiError> {
  reject(input.validate())?;
  let outcome = state
    .store
    .update_outcome(kind, id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found(kind.label(), id))?;
  Ok(Json(outcome))
}

async fn delete<S: AccreditationStore + 'static>(
  kind: OutcomeKind,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_outcome(kind, id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found(kind.label(), id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── SO ↔ PEO ─────────────────────────────────────────────────────────────────

/// `GET /programs/{id}/so-peo-mappings`
pub async fn so_peo<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
) -> Result<Json<MappingSet<SoPeoMapping>>, ApiError> {
  if state.store.get_program(program_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", program_id));
  }
  let mappings = state.store.so_peo_mappings(program_id).await.map_err(ApiError::store)?;
  Ok(Json(MappingSet { mappings }))
}

/// `PUT /programs/{id}/so-peo-mappings`
pub async fn replace_so_peo<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
  Body(body): Body<MappingSet<SoPeoMapping>>,
) -> Result<Json<MappingSet<SoPeoMapping>>, ApiError> {
  let store = state.store.as_ref();
  if store.get_program(program_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", program_id));
  }
  let so_ids = ids_of(store, OutcomeKind::So, program_id).await?;
  let peo_ids = ids_of(store, OutcomeKind::Peo, program_id).await?;
  reject(check_pairs(
    &body.mappings,
    |m| (m.so_id, m.peo_id),
    ("so_id", &so_ids),
    ("peo_id", &peo_ids),
  ))?;

  let mappings = store
    .replace_so_peo_mappings(program_id, body.mappings)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(MappingSet { mappings }))
}

// ─── CLO ↔ SO ─────────────────────────────────────────────────────────────────

/// `GET /courses/{id}/clo-so-mappings`
pub async fn clo_so<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(course_id): Path<i64>,
) -> Result<Json<MappingSet<CloSoMapping>>, ApiError> {
  if state.store.get_course(course_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("course", course_id));
  }
  let mappings = state.store.clo_so_mappings(course_id).await.map_err(ApiError::store)?;
  Ok(Json(MappingSet { mappings }))
}

/// `PUT /courses/{id}/clo-so-mappings`: CLOs must belong to the course and
/// SOs to the course's program.
pub async fn replace_clo_so<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(course_id): Path<i64>,
  Body(body): Body<MappingSet<CloSoMapping>>,
) -> Result<Json<MappingSet<CloSoMapping>>, ApiError> {
  let store = state.store.as_ref();
  let course = store
    .get_course(course_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", course_id))?;
  let clo_ids = ids_of(store, OutcomeKind::Clo, course_id).await?;
  let so_ids = ids_of(store, OutcomeKind::So, course.program_id).await?;
  reject(check_pairs(
    &body.mappings,
    |m| (m.clo_id, m.so_id),
    ("clo_id", &clo_ids),
    ("so_id", &so_ids),
  ))?;

  let mappings = store
    .replace_clo_so_mappings(course_id, body.mappings)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(MappingSet { mappings }))
}
