//! [`SqliteStore`], the SQLite implementation of [`AccreditationStore`].

use std::path::Path;

use abet_core::{
  account::UserAccount,
  checklist::{ChecklistItem, ChecklistItemUpdate, ChecklistView, NewChecklistItem},
  course::{Course, CourseInput, InstructorSyllabus, SyllabusRecord, SyllabusUpdate},
  evidence::{EvidenceFile, NewEvidence},
  faculty::{FacultyInput, FacultyMember, FacultyProfile, FacultyRecords},
  outcome::{CloSoMapping, Outcome, OutcomeInput, OutcomeKind, SoPeoMapping},
  program::{Cycle, Program, ProgramInput},
  section::{Section, SectionPayload, SectionView},
  store::AccreditationStore,
};

use crate::{
  Error, Result, accounts, checklist, courses, evidence, faculty, outcomes, programs,
  schema::SCHEMA, sections,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An accreditation records store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread. Domain errors raised inside `f` are
  /// carried back as-is rather than being folded into the connection error.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Row count of `table`, for tests that check what a delete left behind.
  #[cfg(test)]
  pub(crate) async fn count(&self, table: &'static str) -> Result<i64> {
    self
      .with_conn(move |c| {
        Ok(c.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await
  }
}

// ─── AccreditationStore impl ─────────────────────────────────────────────────

impl AccreditationStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn find_user_by_email(&self, email: String) -> Result<Option<UserAccount>> {
    self.with_conn(move |c| accounts::find_by_email(c, &email)).await
  }

  async fn get_user(&self, user_id: i64) -> Result<Option<UserAccount>> {
    self.with_conn(move |c| accounts::get_user(c, user_id)).await
  }

  async fn set_password_hash(&self, user_id: i64, password_hash: String) -> Result<bool> {
    self
      .with_conn(move |c| accounts::set_password_hash(c, user_id, &password_hash))
      .await
  }

  async fn upsert_user(
    &self,
    email: String,
    password_hash: String,
    role_name: String,
  ) -> Result<UserAccount> {
    self
      .with_conn(move |c| accounts::upsert_user(c, &email, &password_hash, &role_name))
      .await
  }

  // ── Programs ──────────────────────────────────────────────────────────────

  async fn list_programs(&self) -> Result<Vec<Program>> {
    self.with_conn(|c| programs::list_programs(c)).await
  }

  async fn get_program(&self, program_id: i64) -> Result<Option<Program>> {
    self.with_conn(move |c| programs::get_program(c, program_id)).await
  }

  async fn program_name_taken(&self, name: String, except: Option<i64>) -> Result<bool> {
    self
      .with_conn(move |c| programs::program_name_taken(c, &name, except))
      .await
  }

  async fn create_program(&self, input: ProgramInput) -> Result<Program> {
    self.with_conn(move |c| programs::create_program(c, input)).await
  }

  async fn update_program(&self, program_id: i64, input: ProgramInput) -> Result<Option<Program>> {
    self
      .with_conn(move |c| programs::update_program(c, program_id, input))
      .await
  }

  async fn delete_program(&self, program_id: i64) -> Result<bool> {
    self.with_conn(move |c| programs::delete_program(c, program_id)).await
  }

  // ── Cycles ────────────────────────────────────────────────────────────────

  async fn list_cycles(&self, program_id: i64) -> Result<Vec<Cycle>> {
    self.with_conn(move |c| programs::list_cycles(c, program_id)).await
  }

  async fn get_cycle(&self, cycle_id: i64) -> Result<Option<Cycle>> {
    self.with_conn(move |c| programs::get_cycle(c, cycle_id)).await
  }

  async fn create_cycle(
    &self,
    program_id: i64,
    start_year: i32,
    end_year: i32,
  ) -> Result<Option<Cycle>> {
    self
      .with_conn(move |c| programs::create_cycle(c, program_id, start_year, end_year))
      .await
  }

  async fn update_cycle(
    &self,
    cycle_id: i64,
    start_year: i32,
    end_year: i32,
  ) -> Result<Option<Cycle>> {
    self
      .with_conn(move |c| programs::update_cycle(c, cycle_id, start_year, end_year))
      .await
  }

  async fn delete_cycle(&self, cycle_id: i64) -> Result<bool> {
    self.with_conn(move |c| programs::delete_cycle(c, cycle_id)).await
  }

  // ── Checklist ─────────────────────────────────────────────────────────────

  async fn ensure_checklist_items(&self, cycle_id: i64) -> Result<usize> {
    self.with_conn(move |c| checklist::ensure_items(c, cycle_id)).await
  }

  async fn cycle_checklist(&self, cycle_id: i64) -> Result<Option<ChecklistView>> {
    self.with_conn(move |c| checklist::cycle_checklist(c, cycle_id)).await
  }

  async fn list_checklist_items(&self, cycle_id: Option<i64>) -> Result<Vec<ChecklistItem>> {
    self.with_conn(move |c| checklist::list_items(c, cycle_id)).await
  }

  async fn get_checklist_item(&self, item_id: i64) -> Result<Option<ChecklistItem>> {
    self.with_conn(move |c| checklist::get_item(c, item_id)).await
  }

  async fn create_checklist_item(&self, input: NewChecklistItem) -> Result<Option<ChecklistItem>> {
    self.with_conn(move |c| checklist::create_item(c, input)).await
  }

  async fn update_checklist_item(
    &self,
    item_id: i64,
    update: ChecklistItemUpdate,
  ) -> Result<Option<ChecklistItem>> {
    self
      .with_conn(move |c| checklist::update_item(c, item_id, update))
      .await
  }

  async fn delete_checklist_item(&self, item_id: i64) -> Result<bool> {
    self.with_conn(move |c| checklist::delete_item(c, item_id)).await
  }

  // ── Section records ───────────────────────────────────────────────────────

  async fn section_view(&self, cycle_id: i64, section: Section) -> Result<Option<SectionView>> {
    self
      .with_conn(move |c| sections::section_view(c, cycle_id, section))
      .await
  }

  async fn save_section(
    &self,
    cycle_id: i64,
    payload: SectionPayload,
  ) -> Result<Option<SectionView>> {
    self
      .with_conn(move |c| sections::save_section(c, cycle_id, payload))
      .await
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn list_courses(&self, program_id: i64, cycle_id: Option<i64>) -> Result<Vec<Course>> {
    self
      .with_conn(move |c| courses::list_courses(c, program_id, cycle_id))
      .await
  }

  async fn get_course(&self, course_id: i64) -> Result<Option<Course>> {
    self.with_conn(move |c| courses::get_course(c, course_id)).await
  }

  async fn course_code_taken(
    &self,
    cycle_id: i64,
    code: String,
    except: Option<i64>,
  ) -> Result<bool> {
    self
      .with_conn(move |c| courses::course_code_taken(c, cycle_id, &code, except))
      .await
  }

  async fn create_course(&self, input: CourseInput) -> Result<Option<Course>> {
    self.with_conn(move |c| courses::create_course(c, input)).await
  }

  async fn update_course(&self, course_id: i64, input: CourseInput) -> Result<Option<Course>> {
    self
      .with_conn(move |c| courses::update_course(c, course_id, input))
      .await
  }

  async fn delete_course(&self, course_id: i64) -> Result<bool> {
    self.with_conn(move |c| courses::delete_course(c, course_id)).await
  }

  // ── Syllabus sections ─────────────────────────────────────────────────────

  async fn list_course_sections(&self, course_id: i64) -> Result<Vec<InstructorSyllabus>> {
    self.with_conn(move |c| courses::list_sections(c, course_id)).await
  }

  async fn faculty_has_section(
    &self,
    course_id: i64,
    faculty_id: i64,
    except: Option<i64>,
  ) -> Result<bool> {
    self
      .with_conn(move |c| courses::faculty_has_section(c, course_id, faculty_id, except))
      .await
  }

  async fn create_syllabus_section(
    &self,
    course_id: i64,
    faculty_id: i64,
    term: String,
  ) -> Result<Option<InstructorSyllabus>> {
    self
      .with_conn(move |c| courses::create_section(c, course_id, faculty_id, term))
      .await
  }

  async fn syllabus(&self, course_id: i64, section_id: i64) -> Result<Option<SyllabusRecord>> {
    self
      .with_conn(move |c| courses::syllabus(c, course_id, section_id))
      .await
  }

  async fn save_syllabus(
    &self,
    course_id: i64,
    section_id: i64,
    update: SyllabusUpdate,
  ) -> Result<Option<SyllabusRecord>> {
    self
      .with_conn(move |c| courses::save_syllabus(c, course_id, section_id, update))
      .await
  }

  async fn delete_syllabus_section(&self, course_id: i64, section_id: i64) -> Result<bool> {
    self
      .with_conn(move |c| courses::delete_section(c, course_id, section_id))
      .await
  }

  // ── Outcomes ──────────────────────────────────────────────────────────────

  async fn list_outcomes(&self, kind: OutcomeKind, owner_id: i64) -> Result<Vec<Outcome>> {
    self
      .with_conn(move |c| outcomes::list_outcomes(c, kind, owner_id))
      .await
  }

  async fn get_outcome(&self, kind: OutcomeKind, outcome_id: i64) -> Result<Option<Outcome>> {
    self
      .with_conn(move |c| outcomes::get_outcome(c, kind, outcome_id))
      .await
  }

  async fn create_outcome(
    &self,
    kind: OutcomeKind,
    owner_id: i64,
    input: OutcomeInput,
  ) -> Result<Option<Outcome>> {
    self
      .with_conn(move |c| outcomes::create_outcome(c, kind, owner_id, input))
      .await
  }

  async fn update_outcome(
    &self,
    kind: OutcomeKind,
    outcome_id: i64,
    input: OutcomeInput,
  ) -> Result<Option<Outcome>> {
    self
      .with_conn(move |c| outcomes::update_outcome(c, kind, outcome_id, input))
      .await
  }

  async fn delete_outcome(&self, kind: OutcomeKind, outcome_id: i64) -> Result<bool> {
    self
      .with_conn(move |c| outcomes::delete_outcome(c, kind, outcome_id))
      .await
  }

  async fn so_peo_mappings(&self, program_id: i64) -> Result<Vec<SoPeoMapping>> {
    self
      .with_conn(move |c| outcomes::so_peo_mappings(c, program_id))
      .await
  }

  async fn replace_so_peo_mappings(
    &self,
    program_id: i64,
    mappings: Vec<SoPeoMapping>,
  ) -> Result<Vec<SoPeoMapping>> {
    self
      .with_conn(move |c| outcomes::replace_so_peo(c, program_id, mappings))
      .await
  }

  async fn clo_so_mappings(&self, course_id: i64) -> Result<Vec<CloSoMapping>> {
    self
      .with_conn(move |c| outcomes::clo_so_mappings(c, course_id))
      .await
  }

  async fn replace_clo_so_mappings(
    &self,
    course_id: i64,
    mappings: Vec<CloSoMapping>,
  ) -> Result<Vec<CloSoMapping>> {
    self
      .with_conn(move |c| outcomes::replace_clo_so(c, course_id, mappings))
      .await
  }

  // ── Faculty ───────────────────────────────────────────────────────────────

  async fn list_faculty(&self) -> Result<Vec<FacultyMember>> {
    self.with_conn(|c| faculty::list_faculty(c)).await
  }

  async fn get_faculty(&self, faculty_id: i64) -> Result<Option<FacultyMember>> {
    self.with_conn(move |c| faculty::get_faculty(c, faculty_id)).await
  }

  async fn faculty_email_taken(&self, email: String, except: Option<i64>) -> Result<bool> {
    self
      .with_conn(move |c| faculty::email_taken(c, &email, except))
      .await
  }

  async fn create_faculty(&self, input: FacultyInput) -> Result<FacultyMember> {
    self.with_conn(move |c| faculty::create_faculty(c, input)).await
  }

  async fn update_faculty(
    &self,
    faculty_id: i64,
    input: FacultyInput,
  ) -> Result<Option<FacultyMember>> {
    self
      .with_conn(move |c| faculty::update_faculty(c, faculty_id, input))
      .await
  }

  async fn delete_faculty(&self, faculty_id: i64) -> Result<bool> {
    self.with_conn(move |c| faculty::delete_faculty(c, faculty_id)).await
  }

  async fn faculty_profile(&self, faculty_id: i64) -> Result<Option<FacultyProfile>> {
    self.with_conn(move |c| faculty::profile(c, faculty_id)).await
  }

  async fn save_faculty_profile(
    &self,
    faculty_id: i64,
    member: Option<FacultyInput>,
    records: FacultyRecords,
  ) -> Result<Option<FacultyProfile>> {
    self
      .with_conn(move |c| faculty::save_profile(c, faculty_id, member, records))
      .await
  }

  async fn replace_faculty_programs(
    &self,
    faculty_id: i64,
    program_ids: Vec<i64>,
  ) -> Result<Option<Vec<Program>>> {
    self
      .with_conn(move |c| faculty::replace_programs(c, faculty_id, program_ids))
      .await
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  async fn list_evidence(&self, cycle_id: i64) -> Result<Vec<EvidenceFile>> {
    self.with_conn(move |c| evidence::list_evidence(c, cycle_id)).await
  }

  async fn get_evidence(&self, evidence_id: i64) -> Result<Option<EvidenceFile>> {
    self.with_conn(move |c| evidence::get_evidence(c, evidence_id)).await
  }

  async fn create_evidence(
    &self,
    cycle_id: i64,
    user_id: i64,
    input: NewEvidence,
  ) -> Result<Option<EvidenceFile>> {
    self
      .with_conn(move |c| evidence::create_evidence(c, cycle_id, user_id, input))
      .await
  }

  async fn update_evidence(
    &self,
    evidence_id: i64,
    input: NewEvidence,
  ) -> Result<Option<EvidenceFile>> {
    self
      .with_conn(move |c| evidence::update_evidence(c, evidence_id, input))
      .await
  }

  async fn delete_evidence(&self, evidence_id: i64) -> Result<bool> {
    self
      .with_conn(move |c| evidence::delete_evidence(c, evidence_id))
      .await
  }
}
