//! Handlers for courses, instructor syllabus sections and syllabus content.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/programs/{id}/courses` | Optional `?cycle_id=` |
//! | `POST` | `/programs/{id}/courses` | Body: [`CourseInput`]; `cycle_id` from body or query |
//! | `GET` `PUT` `DELETE` | `/programs/{id}/courses/{cid}` | Delete cascades through sections |
//! | `GET`  | `/programs/{id}/courses/{cid}/sections` | |
//! | `POST` | `/programs/{id}/courses/{cid}/sections` | Body: `{"faculty_id": n, "term": "..."}` |
//! | `GET` `PUT` `DELETE` | `/programs/{id}/courses/{cid}/sections/{sid}/syllabus` | Nested course + section + syllabus |

use std::collections::HashSet;

use abet_core::{
  FieldErrors,
  course::{
    Course, CourseInput, InstructorSyllabus, NewSection, SyllabusDetail, SyllabusUpdate,
  },
  faculty::FacultyOption,
  outcome::OutcomeKind,
  store::AccreditationStore,
  validate::row_field,
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

const MSG_CODE_TAKEN: &str = "A course with this code already exists in this cycle.";
const MSG_SECTION_TAKEN: &str =
  "This faculty member already has a syllabus section for this course.";

/// The course, provided it belongs to `program_id`.
async fn course_in_program<S: AccreditationStore>(
  store: &S,
  program_id: i64,
  course_id: i64,
) -> Result<Course, ApiError> {
  store
    .get_course(course_id)
    .await
    .map_err(ApiError::store)?
    .filter(|c| c.program_id == program_id)
    .ok_or_else(|| ApiError::not_found("course", course_id))
}

async fn check_code<S: AccreditationStore>(
  store: &S,
  errors: &mut FieldErrors,
  field: &str,
  cycle_id: i64,
  code: &str,
  except: Option<i64>,
) -> Result<(), ApiError> {
  if !code.is_empty()
    && store
      .course_code_taken(cycle_id, code.to_string(), except)
      .await
      .map_err(ApiError::store)?
  {
    errors.add(field, MSG_CODE_TAKEN);
  }
  Ok(())
}

// ─── Courses ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CycleParams {
  pub cycle_id: Option<i64>,
}

/// `GET /programs/{id}/courses[?cycle_id=<id>]`
pub async fn list<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
  Query(params): Query<CycleParams>,
) -> Result<Json<Vec<Course>>, ApiError> {
  if state.store.get_program(program_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", program_id));
  }
  let courses = state
    .store
    .list_courses(program_id, params.cycle_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(courses))
}

/// `POST /programs/{id}/courses[?cycle_id=<id>]`
pub async fn create<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path(program_id): Path<i64>,
  Query(params): Query<CycleParams>,
  Body(mut input): Body<CourseInput>,
) -> Result<impl IntoResponse, ApiError> {
  if state.store.get_program(program_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("program", program_id));
  }
  input.cycle_id = input.cycle_id.or(params.cycle_id);
  let mut errors = input.validate();

  match input.cycle_id {
    None => errors.add("cycle_id", abet_core::validate::MSG_REQUIRED),
    Some(cycle_id) => {
      let cycle = state.store.get_cycle(cycle_id).await.map_err(ApiError::store)?;
      if cycle.is_some_and(|c| c.program_id == program_id) {
        let code = input.course_code.as_str();
        check_code(state.store.as_ref(), &mut errors, "course_code", cycle_id, code, None).await?;
      } else {
        errors.add("cycle_id", format!("Cycle {cycle_id} does not belong to this program."));
      }
    }
  }
  reject(errors)?;

  let course = state
    .store
    .create_course(input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("program", program_id))?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /programs/{id}/courses/{cid}`
pub async fn get_one<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id)): Path<(i64, i64)>,
) -> Result<Json<Course>, ApiError> {
  Ok(Json(course_in_program(state.store.as_ref(), program_id, course_id).await?))
}

/// `PUT /programs/{id}/courses/{cid}`: a course never moves between cycles,
/// so any `cycle_id` in the body is ignored.
pub async fn update<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id)): Path<(i64, i64)>,
  Body(mut input): Body<CourseInput>,
) -> Result<Json<Course>, ApiError> {
  let course = course_in_program(state.store.as_ref(), program_id, course_id).await?;
  input.cycle_id = Some(course.cycle_id);
  let mut errors = input.validate();
  check_code(
    state.store.as_ref(),
    &mut errors,
    "course_code",
    course.cycle_id,
    &input.course_code,
    Some(course_id),
  )
  .await?;
  reject(errors)?;

  let course = state
    .store
    .update_course(course_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", course_id))?;
  Ok(Json(course))
}

/// `DELETE /programs/{id}/courses/{cid}`
pub async fn delete<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  course_in_program(state.store.as_ref(), program_id, course_id).await?;
  if !state.store.delete_course(course_id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("course", course_id));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Sections ─────────────────────────────────────────────────────────────────

/// `GET /programs/{id}/courses/{cid}/sections`
pub async fn list_sections<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<InstructorSyllabus>>, ApiError> {
  course_in_program(state.store.as_ref(), program_id, course_id).await?;
  let sections = state
    .store
    .list_course_sections(course_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sections))
}

async fn check_faculty<S: AccreditationStore>(
  store: &S,
  errors: &mut FieldErrors,
  field: &str,
  course_id: i64,
  faculty_id: i64,
  except: Option<i64>,
) -> Result<(), ApiError> {
  if store.get_faculty(faculty_id).await.map_err(ApiError::store)?.is_none() {
    errors.add(field, format!("Unknown faculty member {faculty_id}."));
  } else if store
    .faculty_has_section(course_id, faculty_id, except)
    .await
    .map_err(ApiError::store)?
  {
    errors.add(field, MSG_SECTION_TAKEN);
  }
  Ok(())
}

/// `POST /programs/{id}/courses/{cid}/sections`
pub async fn create_section<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id)): Path<(i64, i64)>,
  Body(mut input): Body<NewSection>,
) -> Result<impl IntoResponse, ApiError> {
  course_in_program(state.store.as_ref(), program_id, course_id).await?;
  let faculty_id = input.validate()?;
  let mut errors = FieldErrors::new();
  check_faculty(state.store.as_ref(), &mut errors, "faculty_id", course_id, faculty_id, None).await?;
  reject(errors)?;

  let section = state
    .store
    .create_syllabus_section(course_id, faculty_id, input.term)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("course", course_id))?;
  Ok((StatusCode::CREATED, Json(section)))
}

// ─── Syllabus ─────────────────────────────────────────────────────────────────

async fn syllabus_detail<S: AccreditationStore>(
  store: &S,
  program_id: i64,
  course_id: i64,
  section_id: i64,
) -> Result<SyllabusDetail, ApiError> {
  let course = course_in_program(store, program_id, course_id).await?;
  let record = store
    .syllabus(course_id, section_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("syllabus section", section_id))?;
  let available_sos = store
    .list_outcomes(OutcomeKind::So, program_id)
    .await
    .map_err(ApiError::store)?;
  let available_clos = store
    .list_outcomes(OutcomeKind::Clo, course_id)
    .await
    .map_err(ApiError::store)?;
  let faculty_options = store
    .list_faculty()
    .await
    .map_err(ApiError::store)?
    .iter()
    .map(FacultyOption::from)
    .collect();
  Ok(SyllabusDetail {
    course,
    section: record.section,
    syllabus: record.content,
    available_sos,
    available_clos,
    faculty_options,
  })
}

/// `GET /programs/{id}/courses/{cid}/sections/{sid}/syllabus`
pub async fn get_syllabus<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id, section_id)): Path<(i64, i64, i64)>,
) -> Result<Json<SyllabusDetail>, ApiError> {
  let detail = syllabus_detail(state.store.as_ref(), program_id, course_id, section_id).await?;
  Ok(Json(detail))
}

/// `PUT /programs/{id}/courses/{cid}/sections/{sid}/syllabus`: course,
/// section and syllabus written in one transaction.
pub async fn update_syllabus<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id, section_id)): Path<(i64, i64, i64)>,
  Body(mut update): Body<SyllabusUpdate>,
) -> Result<Json<SyllabusDetail>, ApiError> {
  let store = state.store.as_ref();
  let course = course_in_program(store, program_id, course_id).await?;
  if store.syllabus(course_id, section_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::not_found("syllabus section", section_id));
  }

  let mut errors = update.validate();
  check_code(
    store,
    &mut errors,
    "course.course_code",
    course.cycle_id,
    &update.course.course_code,
    Some(course_id),
  )
  .await?;
  if let Some(faculty_id) = update.section.faculty_id.filter(|id| *id > 0) {
    check_faculty(store, &mut errors, "section.faculty_id", course_id, faculty_id, Some(section_id))
      .await?;
  }

  let clo_ids: HashSet<i64> = store
    .list_outcomes(OutcomeKind::Clo, course_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|o| o.outcome_id)
    .collect();
  let so_ids: HashSet<i64> = store
    .list_outcomes(OutcomeKind::So, program_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|o| o.outcome_id)
    .collect();
  for (i, m) in update.syllabus.clo_mappings.iter().enumerate() {
    if m.clo_id > 0 && !clo_ids.contains(&m.clo_id) {
      errors.add(
        row_field("syllabus.clo_mappings", i, "clo_id"),
        format!("CLO {} does not belong to this course.", m.clo_id),
      );
    }
    if let Some(so_id) = m.so_id.filter(|id| !so_ids.contains(id)) {
      errors.add(
        row_field("syllabus.clo_mappings", i, "so_id"),
        format!("SO {so_id} does not belong to this program."),
      );
    }
  }
  reject(errors)?;

  store
    .save_syllabus(course_id, section_id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("syllabus section", section_id))?;
  let detail = syllabus_detail(store, program_id, course_id, section_id).await?;
  Ok(Json(detail))
}

/// `DELETE /programs/{id}/courses/{cid}/sections/{sid}/syllabus`: removes
/// the section with its exclusive rows; shared rows go once unreferenced.
pub async fn delete_section<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Path((program_id, course_id, section_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode, ApiError> {
  course_in_program(state.store.as_ref(), program_id, course_id).await?;
  if !state
    .store
    .delete_syllabus_section(course_id, section_id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::not_found("syllabus section", section_id));
  }
  Ok(StatusCode::NO_CONTENT)
}
