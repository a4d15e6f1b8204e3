//! The `AccreditationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `abet-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.
//!
//! Lookups of a single entity return `Option`; deletes and replaces return
//! `bool`/`Option` so handlers can map absence to 404. Inputs are expected to
//! have been validated already.

use std::future::Future;

use crate::{
  account::UserAccount,
  checklist::{ChecklistItem, ChecklistItemUpdate, ChecklistView, NewChecklistItem},
  course::{
    Course, CourseInput, InstructorSyllabus, SyllabusRecord, SyllabusUpdate,
  },
  evidence::{EvidenceFile, NewEvidence},
  faculty::{FacultyInput, FacultyMember, FacultyProfile, FacultyRecords},
  outcome::{CloSoMapping, Outcome, OutcomeInput, OutcomeKind, SoPeoMapping},
  program::{Cycle, Program, ProgramInput},
  section::{Section, SectionPayload, SectionView},
};

/// Abstraction over an accreditation records backend.
///
/// Every multi-statement mutation is atomic: either all of its writes land or
/// none do. All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AccreditationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Case-insensitive lookup by email.
  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + '_;

  /// Replace a user's stored password hash. Returns `false` if the user does
  /// not exist.
  fn set_password_hash(
    &self,
    user_id: i64,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Create the account (and role) if missing, otherwise reset its hash and
  /// role.
  fn upsert_user(
    &self,
    email: String,
    password_hash: String,
    role_name: String,
  ) -> impl Future<Output = Result<UserAccount, Self::Error>> + Send + '_;

  // ── Programs ──────────────────────────────────────────────────────────

  fn list_programs(
    &self,
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + '_;

  fn get_program(
    &self,
    program_id: i64,
  ) -> impl Future<Output = Result<Option<Program>, Self::Error>> + Send + '_;

  /// Case-insensitive; `except` excludes the program being updated.
  fn program_name_taken(
    &self,
    name: String,
    except: Option<i64>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn create_program(
    &self,
    input: ProgramInput,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + '_;

  fn update_program(
    &self,
    program_id: i64,
    input: ProgramInput,
  ) -> impl Future<Output = Result<Option<Program>, Self::Error>> + Send + '_;

  /// Delete a program with its cycles, outcomes and assignments. Syllabus
  /// sections go through the cascading section delete.
  fn delete_program(
    &self,
    program_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Cycles ────────────────────────────────────────────────────────────

  fn list_cycles(
    &self,
    program_id: i64,
  ) -> impl Future<Output = Result<Vec<Cycle>, Self::Error>> + Send + '_;

  fn get_cycle(
    &self,
    cycle_id: i64,
  ) -> impl Future<Output = Result<Option<Cycle>, Self::Error>> + Send + '_;

  /// Returns `None` if the program does not exist.
  fn create_cycle(
    &self,
    program_id: i64,
    start_year: i32,
    end_year: i32,
  ) -> impl Future<Output = Result<Option<Cycle>, Self::Error>> + Send + '_;

  fn update_cycle(
    &self,
    cycle_id: i64,
    start_year: i32,
    end_year: i32,
  ) -> impl Future<Output = Result<Option<Cycle>, Self::Error>> + Send + '_;

  fn delete_cycle(
    &self,
    cycle_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Checklist ─────────────────────────────────────────────────────────

  /// Create a default item for each recognised slot with none. Returns the
  /// number of items created; running it again creates nothing.
  fn ensure_checklist_items(
    &self,
    cycle_id: i64,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Ensure the default items, recompute and store the cycle's overall
  /// progress, and return the checklist. `None` if the cycle does not exist.
  fn cycle_checklist(
    &self,
    cycle_id: i64,
  ) -> impl Future<Output = Result<Option<ChecklistView>, Self::Error>> + Send + '_;

  fn list_checklist_items(
    &self,
    cycle_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<ChecklistItem>, Self::Error>> + Send + '_;

  fn get_checklist_item(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<Option<ChecklistItem>, Self::Error>> + Send + '_;

  /// Returns `None` if the cycle does not exist. Cycle progress is
  /// recomputed.
  fn create_checklist_item(
    &self,
    input: NewChecklistItem,
  ) -> impl Future<Output = Result<Option<ChecklistItem>, Self::Error>> + Send + '_;

  fn update_checklist_item(
    &self,
    item_id: i64,
    update: ChecklistItemUpdate,
  ) -> impl Future<Output = Result<Option<ChecklistItem>, Self::Error>> + Send + '_;

  fn delete_checklist_item(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Section records ───────────────────────────────────────────────────

  /// Read a section record, creating an empty one on first access. `None` if
  /// the cycle does not exist.
  fn section_view(
    &self,
    cycle_id: i64,
    section: Section,
  ) -> impl Future<Output = Result<Option<SectionView>, Self::Error>> + Send + '_;

  /// Replace the record's fields and rows, store its completion, sync the
  /// owning checklist item and the cycle progress.
  fn save_section(
    &self,
    cycle_id: i64,
    payload: SectionPayload,
  ) -> impl Future<Output = Result<Option<SectionView>, Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  fn list_courses(
    &self,
    program_id: i64,
    cycle_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// `code` must already be normalised.
  fn course_code_taken(
    &self,
    cycle_id: i64,
    code: String,
    except: Option<i64>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// `input.cycle_id` must be set. Returns `None` if the cycle does not
  /// exist.
  fn create_course(
    &self,
    input: CourseInput,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// Updates the catalogue fields; the owning cycle never changes.
  fn update_course(
    &self,
    course_id: i64,
    input: CourseInput,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// Delete a course, its CLOs and every one of its syllabus sections.
  fn delete_course(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Syllabus sections ─────────────────────────────────────────────────

  fn list_course_sections(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Vec<InstructorSyllabus>, Self::Error>> + Send + '_;

  /// Whether `faculty_id` already has a section of the course.
  fn faculty_has_section(
    &self,
    course_id: i64,
    faculty_id: i64,
    except: Option<i64>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Reuses the shared syllabus rows of an existing sibling section, or
  /// creates fresh ones. Returns `None` if the course does not exist.
  fn create_syllabus_section(
    &self,
    course_id: i64,
    faculty_id: i64,
    term: String,
  ) -> impl Future<Output = Result<Option<InstructorSyllabus>, Self::Error>> + Send + '_;

  fn syllabus(
    &self,
    course_id: i64,
    section_id: i64,
  ) -> impl Future<Output = Result<Option<SyllabusRecord>, Self::Error>> + Send + '_;

  /// Write course fields, section fields and syllabus content in one
  /// transaction.
  fn save_syllabus(
    &self,
    course_id: i64,
    section_id: i64,
    update: SyllabusUpdate,
  ) -> impl Future<Output = Result<Option<SyllabusRecord>, Self::Error>> + Send + '_;

  /// Cascading delete: exclusive children, the section, then any shared row
  /// left unreferenced.
  fn delete_syllabus_section(
    &self,
    course_id: i64,
    section_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Outcomes ──────────────────────────────────────────────────────────

  fn list_outcomes(
    &self,
    kind: OutcomeKind,
    owner_id: i64,
  ) -> impl Future<Output = Result<Vec<Outcome>, Self::Error>> + Send + '_;

  fn get_outcome(
    &self,
    kind: OutcomeKind,
    outcome_id: i64,
  ) -> impl Future<Output = Result<Option<Outcome>, Self::Error>> + Send + '_;

  /// Returns `None` if the owner does not exist.
  fn create_outcome(
    &self,
    kind: OutcomeKind,
    owner_id: i64,
    input: OutcomeInput,
  ) -> impl Future<Output = Result<Option<Outcome>, Self::Error>> + Send + '_;

  fn update_outcome(
    &self,
    kind: OutcomeKind,
    outcome_id: i64,
    input: OutcomeInput,
  ) -> impl Future<Output = Result<Option<Outcome>, Self::Error>> + Send + '_;

  /// Also removes every mapping that references the outcome.
  fn delete_outcome(
    &self,
    kind: OutcomeKind,
    outcome_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn so_peo_mappings(
    &self,
    program_id: i64,
  ) -> impl Future<Output = Result<Vec<SoPeoMapping>, Self::Error>> + Send + '_;

  /// Replace every SO→PEO mapping of the program. Duplicate pairs collapse.
  fn replace_so_peo_mappings(
    &self,
    program_id: i64,
    mappings: Vec<SoPeoMapping>,
  ) -> impl Future<Output = Result<Vec<SoPeoMapping>, Self::Error>> + Send + '_;

  fn clo_so_mappings(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Vec<CloSoMapping>, Self::Error>> + Send + '_;

  /// Replace every CLO→SO mapping of the course. Duplicate pairs collapse.
  fn replace_clo_so_mappings(
    &self,
    course_id: i64,
    mappings: Vec<CloSoMapping>,
  ) -> impl Future<Output = Result<Vec<CloSoMapping>, Self::Error>> + Send + '_;

  // ── Faculty ───────────────────────────────────────────────────────────

  fn list_faculty(
    &self,
  ) -> impl Future<Output = Result<Vec<FacultyMember>, Self::Error>> + Send + '_;

  fn get_faculty(
    &self,
    faculty_id: i64,
  ) -> impl Future<Output = Result<Option<FacultyMember>, Self::Error>> + Send + '_;

  fn faculty_email_taken(
    &self,
    email: String,
    except: Option<i64>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn create_faculty(
    &self,
    input: FacultyInput,
  ) -> impl Future<Output = Result<FacultyMember, Self::Error>> + Send + '_;

  fn update_faculty(
    &self,
    faculty_id: i64,
    input: FacultyInput,
  ) -> impl Future<Output = Result<Option<FacultyMember>, Self::Error>> + Send + '_;

  /// Deletes the member's sections through the cascading section delete.
  fn delete_faculty(
    &self,
    faculty_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn faculty_profile(
    &self,
    faculty_id: i64,
  ) -> impl Future<Output = Result<Option<FacultyProfile>, Self::Error>> + Send + '_;

  /// Optionally update the member, then replace all dependent rows, in one
  /// transaction.
  fn save_faculty_profile(
    &self,
    faculty_id: i64,
    member: Option<FacultyInput>,
    records: FacultyRecords,
  ) -> impl Future<Output = Result<Option<FacultyProfile>, Self::Error>> + Send + '_;

  /// Replace the member's program assignments. Unknown program ids are the
  /// caller's concern.
  fn replace_faculty_programs(
    &self,
    faculty_id: i64,
    program_ids: Vec<i64>,
  ) -> impl Future<Output = Result<Option<Vec<Program>>, Self::Error>> + Send + '_;

  // ── Evidence ──────────────────────────────────────────────────────────

  fn list_evidence(
    &self,
    cycle_id: i64,
  ) -> impl Future<Output = Result<Vec<EvidenceFile>, Self::Error>> + Send + '_;

  fn get_evidence(
    &self,
    evidence_id: i64,
  ) -> impl Future<Output = Result<Option<EvidenceFile>, Self::Error>> + Send + '_;

  /// Returns `None` if the cycle does not exist.
  fn create_evidence(
    &self,
    cycle_id: i64,
    user_id: i64,
    input: NewEvidence,
  ) -> impl Future<Output = Result<Option<EvidenceFile>, Self::Error>> + Send + '_;

  fn update_evidence(
    &self,
    evidence_id: i64,
    input: NewEvidence,
  ) -> impl Future<Output = Result<Option<EvidenceFile>, Self::Error>> + Send + '_;

  fn delete_evidence(
    &self,
    evidence_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
