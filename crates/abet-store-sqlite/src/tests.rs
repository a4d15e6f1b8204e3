//! Integration tests for `SqliteStore` against an in-memory database.

use abet_core::{
  checklist::{ChecklistItemUpdate, NewChecklistItem, STATUS_COMPLETE, STATUS_INCOMPLETE},
  course::{
    Assessment, CloAssignment, CourseInput, CourseRef, SyllabusContent, SyllabusCourse,
    SyllabusSection, SyllabusUpdate,
  },
  evidence::NewEvidence,
  faculty::{FacultyInput, FacultyRecords},
  outcome::{CloSoMapping, OutcomeInput, OutcomeKind, SoPeoMapping},
  program::{Cycle, ProgramInput},
  section::{Section, SectionPayload},
  slot::CriterionSlot,
  store::AccreditationStore,
};
use chrono::NaiveDate;
use serde_json::json;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn program_and_cycle(s: &SqliteStore) -> Cycle {
  let program = s
    .create_program(ProgramInput {
      program_name:  "Computer and Communications Engineering".into(),
      program_level: "Undergraduate".into(),
    })
    .await
    .unwrap();
  s.create_cycle(program.program_id, 2025, 2031)
    .await
    .unwrap()
    .expect("program exists")
}

fn payload(section: Section, body: serde_json::Value) -> SectionPayload {
  SectionPayload::from_json(section, body).expect("valid payload")
}

// ─── Programs and cycles ─────────────────────────────────────────────────────

#[tokio::test]
async fn program_names_are_unique_case_insensitively() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;

  assert!(
    s.program_name_taken("computer and communications engineering".into(), None)
      .await
      .unwrap()
  );
  assert!(
    !s.program_name_taken("computer and communications engineering".into(), Some(cycle.program_id))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn cycle_for_missing_program_is_none() {
  let s = store().await;
  assert!(s.create_cycle(42, 2025, 2031).await.unwrap().is_none());
}

// ─── Checklist ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_checklist_items_is_idempotent() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;

  assert_eq!(s.ensure_checklist_items(cycle.cycle_id).await.unwrap(), 10);
  assert_eq!(s.ensure_checklist_items(cycle.cycle_id).await.unwrap(), 0);

  let items = s.list_checklist_items(Some(cycle.cycle_id)).await.unwrap();
  assert_eq!(items.len(), 10);
  for slot in CriterionSlot::RECOGNIZED {
    assert_eq!(items.iter().filter(|i| i.slot == slot).count(), 1);
  }
}

#[tokio::test]
async fn checklist_progress_is_mean_of_slots_and_stored() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let view = s.cycle_checklist(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(view.overall_progress, 0.0);
  assert_eq!(view.items.len(), 10);
  assert_eq!(view.items[0].criterion_number, Some(0));
  assert_eq!(view.items[9].criterion_number, Some(9));

  for entry in view.items.iter().take(3) {
    let updated = s
      .update_checklist_item(entry.item.item_id, ChecklistItemUpdate {
        completion_percentage: Some(100.0),
        ..Default::default()
      })
      .await
      .unwrap()
      .unwrap();
    assert_eq!(updated.status, STATUS_COMPLETE);
  }

  let view = s.cycle_checklist(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(view.overall_progress, 30.0);
  let stored = s.get_cycle(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(stored.overall_progress_percentage, 30.0);
}

#[tokio::test]
async fn checklist_for_missing_cycle_is_none() {
  let s = store().await;
  assert!(s.cycle_checklist(7).await.unwrap().is_none());
}

#[tokio::test]
async fn items_without_slot_use_legacy_names() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;

  let item = s
    .create_checklist_item(NewChecklistItem {
      cycle_id:              cycle.cycle_id,
      slot:                  None,
      item_name:             "Criterion 4 – assessment summary".into(),
      completion_percentage: 50.0,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(item.slot, CriterionSlot::Criterion4);
  assert_eq!(item.status, STATUS_INCOMPLETE);

  // The extra item already covers criterion 4, so only nine defaults remain.
  assert_eq!(s.ensure_checklist_items(cycle.cycle_id).await.unwrap(), 9);
  let view = s.cycle_checklist(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(view.overall_progress, 5.0);
}

// ─── Section records ─────────────────────────────────────────────────────────

#[tokio::test]
async fn section_record_is_created_once() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;

  let first = s.section_view(cycle.cycle_id, Section::Criterion7).await.unwrap().unwrap();
  let second = s.section_view(cycle.cycle_id, Section::Criterion7).await.unwrap().unwrap();
  assert_eq!(first.record.record_id, second.record.record_id);
  assert_eq!(s.count("section_records").await.unwrap(), 1);
  assert!(first.rows.is_empty());
  assert_eq!(first.checklist_item_id, None);
}

#[tokio::test]
async fn saving_a_section_feeds_its_checklist_item() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  s.ensure_checklist_items(cycle.cycle_id).await.unwrap();

  let half = payload(
    Section::Criterion3,
    json!({ "outcomes_publication_location": "Catalog, p. 41" }),
  );
  let view = s.save_section(cycle.cycle_id, half).await.unwrap().unwrap();
  assert_eq!(view.record.completion_percentage, 50.0);

  let item_id = view.checklist_item_id.expect("linked item");
  let item = s.get_checklist_item(item_id).await.unwrap().unwrap();
  assert_eq!(item.slot, CriterionSlot::Criterion3);
  assert_eq!(item.completion_percentage, 50.0);
  assert_eq!(item.status, STATUS_INCOMPLETE);
  // The default item was adopted rather than a second one created.
  assert_eq!(s.count("checklist_items").await.unwrap(), 10);

  let full = payload(
    Section::Criterion3,
    json!({
      "outcomes_publication_location": "Catalog, p. 41",
      "so_peo_relationship_explanation": "Each SO prepares graduates for PEO 1-3.",
    }),
  );
  let view = s.save_section(cycle.cycle_id, full).await.unwrap().unwrap();
  assert_eq!(view.checklist_item_id, Some(item_id));
  let item = s.get_checklist_item(item_id).await.unwrap().unwrap();
  assert_eq!(item.completion_percentage, 100.0);
  assert_eq!(item.status, STATUS_COMPLETE);

  let stored = s.get_cycle(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(stored.overall_progress_percentage, 10.0);
}

#[tokio::test]
async fn appendices_keep_their_own_items() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  s.ensure_checklist_items(cycle.cycle_id).await.unwrap();

  let body = json!({
    "labs_covered_count": 3,
    "high_value_assets_count": 1,
    "equipment_rows": [
      {
        "equipment_name": "Vector network analyser",
        "category": "RF",
        "quantity": 1,
        "location_lab": "RF lab",
        "instructional_use": "EECE 430",
      }
    ]
  });
  let view = s
    .save_section(cycle.cycle_id, payload(Section::AppendixC, body))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(view.record.completion_percentage, 100.0);
  assert_eq!(view.rows.len(), 1);

  let items = s.list_checklist_items(Some(cycle.cycle_id)).await.unwrap();
  let appendix_items: Vec<_> = items.iter().filter(|i| i.slot == CriterionSlot::Appendices).collect();
  assert_eq!(appendix_items.len(), 2);
  let default = appendix_items.iter().find(|i| i.item_name == "Appendices").unwrap();
  assert_eq!(default.record_id, None);
  let own = appendix_items.iter().find(|i| i.item_name == "Appendix C - Equipment").unwrap();
  assert_eq!(own.completion_percentage, 100.0);

  // Highest item in the slot wins.
  let view = s.cycle_checklist(cycle.cycle_id).await.unwrap().unwrap();
  assert_eq!(view.overall_progress, 10.0);
}

#[tokio::test]
async fn saving_replaces_rows() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;

  let two = json!({ "staffing_rows": [ { "category": "Technical" }, { "category": "Administrative" } ] });
  s.save_section(cycle.cycle_id, payload(Section::Criterion8, two)).await.unwrap();
  let one = json!({ "staffing_rows": [ { "category": "Instructional assistants", "number_of_staff": 10 } ] });
  let view = s
    .save_section(cycle.cycle_id, payload(Section::Criterion8, one))
    .await
    .unwrap()
    .unwrap();

  assert_eq!(view.rows.len(), 1);
  assert_eq!(s.count("section_rows").await.unwrap(), 1);
  let wire = view.to_wire().unwrap();
  assert_eq!(wire["staffing_rows"][0]["number_of_staff"], 10);
  assert_eq!(wire["record"]["section"], "criterion8");
}

// ─── Courses and syllabi ─────────────────────────────────────────────────────

fn course_input(cycle_id: i64, code: &str) -> CourseInput {
  let mut input = CourseInput {
    cycle_id: Some(cycle_id),
    course_code: code.into(),
    course_title: "Signals and Systems".into(),
    credits: Some(3.0),
    contact_hours: Some(3.0),
    course_type: String::new(),
  };
  assert!(input.validate().is_empty());
  input
}

async fn faculty(s: &SqliteStore, email: &str) -> i64 {
  s.create_faculty(FacultyInput {
    full_name: format!("Member {email}"),
    email: email.into(),
    ..Default::default()
  })
  .await
  .unwrap()
  .faculty_id
}

#[tokio::test]
async fn duplicate_course_codes_are_detected_after_normalising() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "eece 310")).await.unwrap().unwrap();
  assert_eq!(course.course_code, "EECE 310");
  assert_eq!(course.course_type, "Required");
  assert_eq!(course.program_id, cycle.program_id);

  let again = course_input(cycle.cycle_id, "  EECE   310 ");
  assert!(
    s.course_code_taken(cycle.cycle_id, again.course_code.clone(), None)
      .await
      .unwrap()
  );
  assert!(
    !s.course_code_taken(cycle.cycle_id, again.course_code, Some(course.course_id))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn second_section_shares_lookup_rows() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let a = faculty(&s, "a@example.edu").await;
  let b = faculty(&s, "b@example.edu").await;

  let first = s.create_syllabus_section(course.course_id, a, "Fall 2025".into()).await.unwrap().unwrap();
  let second = s.create_syllabus_section(course.course_id, b, "Spring 2026".into()).await.unwrap().unwrap();

  assert_eq!(first.unified_syllabus_id, second.unified_syllabus_id);
  assert_eq!(first.description_id, second.description_id);
  assert_eq!(first.outline_id, second.outline_id);
  assert_eq!(first.additional_info_id, second.additional_info_id);

  let course = s.get_course(course.course_id).await.unwrap().unwrap();
  assert_eq!(course.unified_syllabus_id, Some(first.unified_syllabus_id));
  assert!(s.faculty_has_section(course.course_id, a, None).await.unwrap());
  assert!(!s.faculty_has_section(course.course_id, a, Some(first.section_id)).await.unwrap());
}

#[tokio::test]
async fn section_delete_keeps_shared_rows_until_unreferenced() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let a = faculty(&s, "a@example.edu").await;
  let b = faculty(&s, "b@example.edu").await;
  let first = s.create_syllabus_section(course.course_id, a, "Fall 2025".into()).await.unwrap().unwrap();
  let second = s.create_syllabus_section(course.course_id, b, "Fall 2025".into()).await.unwrap().unwrap();

  let mut update = SyllabusUpdate {
    course:   SyllabusCourse { course_code: "EECE 310".into(), ..Default::default() },
    section:  SyllabusSection { term: "Fall 2025".into(), faculty_id: Some(a) },
    syllabus: SyllabusContent {
      assessments: vec![Assessment { assessment_type: "Final".into(), weight_percentage: 40.0 }],
      ..Default::default()
    },
  };
  assert!(update.validate().is_empty());
  s.save_syllabus(course.course_id, first.section_id, update).await.unwrap().unwrap();

  assert!(s.delete_syllabus_section(course.course_id, first.section_id).await.unwrap());
  assert_eq!(s.count("syllabus_assessments").await.unwrap(), 0);
  assert_eq!(s.count("syllabus_descriptions").await.unwrap(), 1);
  assert_eq!(s.count("unified_syllabi").await.unwrap(), 1);

  assert!(s.delete_syllabus_section(course.course_id, second.section_id).await.unwrap());
  assert_eq!(s.count("syllabus_descriptions").await.unwrap(), 0);
  assert_eq!(s.count("syllabus_outlines").await.unwrap(), 0);
  assert_eq!(s.count("syllabus_additional_info").await.unwrap(), 0);
  // The course still references the unified syllabus.
  assert_eq!(s.count("unified_syllabi").await.unwrap(), 1);

  assert!(s.delete_course(course.course_id).await.unwrap());
  assert_eq!(s.count("unified_syllabi").await.unwrap(), 0);
  assert!(!s.delete_syllabus_section(course.course_id, second.section_id).await.unwrap());
}

#[tokio::test]
async fn program_delete_cascades_through_sections() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  s.cycle_checklist(cycle.cycle_id).await.unwrap();
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let a = faculty(&s, "a@example.edu").await;
  s.create_syllabus_section(course.course_id, a, "Fall 2025".into()).await.unwrap().unwrap();
  s.create_outcome(OutcomeKind::Clo, course.course_id, OutcomeInput {
    code: "CLO 1".into(),
    description: "Analyse LTI systems".into(),
  })
  .await
  .unwrap()
  .unwrap();

  assert!(s.delete_program(cycle.program_id).await.unwrap());
  for table in [
    "programs",
    "cycles",
    "checklist_items",
    "courses",
    "instructor_syllabi",
    "syllabus_descriptions",
    "unified_syllabi",
    "course_learning_outcomes",
  ] {
    assert_eq!(s.count(table).await.unwrap(), 0, "{table} not empty");
  }
  // Faculty members are not owned by programs.
  assert_eq!(s.count("faculty_members").await.unwrap(), 1);
}

#[tokio::test]
async fn syllabus_round_trips_children_and_clo_mappings() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let a = faculty(&s, "a@example.edu").await;
  let section = s.create_syllabus_section(course.course_id, a, "Fall 2025".into()).await.unwrap().unwrap();
  let so = s
    .create_outcome(OutcomeKind::So, cycle.program_id, OutcomeInput {
      code: "SO 1".into(),
      description: "Solve complex engineering problems".into(),
    })
    .await
    .unwrap()
    .unwrap();
  let clo = s
    .create_outcome(OutcomeKind::Clo, course.course_id, OutcomeInput {
      code: "CLO 1".into(),
      description: "Compute Fourier transforms".into(),
    })
    .await
    .unwrap()
    .unwrap();

  let update = SyllabusUpdate {
    course:   SyllabusCourse {
      course_code: "EECE 310".into(),
      credits: Some(4.0),
      course_type: "Required".into(),
      ..Default::default()
    },
    section:  SyllabusSection { term: "Spring 2026".into(), faculty_id: Some(a) },
    syllabus: SyllabusContent {
      catalog_description: "Continuous and discrete signals.".into(),
      design_content_percentage: 25.0,
      prerequisites: vec![CourseRef { course_code: "MATH 202".into() }],
      clo_mappings: vec![
        CloAssignment { clo_id: clo.outcome_id, so_id: Some(so.outcome_id) },
        CloAssignment { clo_id: clo.outcome_id, so_id: None },
      ],
      ..Default::default()
    },
  };
  let saved = s
    .save_syllabus(course.course_id, section.section_id, update)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(saved.section.term, "Spring 2026");
  assert_eq!(saved.content.catalog_description, "Continuous and discrete signals.");
  assert_eq!(saved.content.prerequisites.len(), 1);
  assert_eq!(saved.content.clo_mappings.len(), 2);

  let course = s.get_course(course.course_id).await.unwrap().unwrap();
  assert_eq!(course.credits, 4.0);
  assert_eq!(course.course_title, "Signals and Systems");
}

// ─── Mappings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn so_peo_mappings_replace_and_dedupe() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let pid = cycle.program_id;
  let outcome = |code: &str| OutcomeInput { code: code.into(), description: format!("{code} text") };
  let so1 = s.create_outcome(OutcomeKind::So, pid, outcome("SO 1")).await.unwrap().unwrap();
  let so2 = s.create_outcome(OutcomeKind::So, pid, outcome("SO 2")).await.unwrap().unwrap();
  let peo = s.create_outcome(OutcomeKind::Peo, pid, outcome("PEO 1")).await.unwrap().unwrap();

  let pair = |so: i64| SoPeoMapping { so_id: so, peo_id: peo.outcome_id };
  let stored = s
    .replace_so_peo_mappings(pid, vec![pair(so1.outcome_id), pair(so1.outcome_id), pair(so2.outcome_id)])
    .await
    .unwrap();
  assert_eq!(stored.len(), 2);

  let stored = s.replace_so_peo_mappings(pid, vec![pair(so2.outcome_id)]).await.unwrap();
  assert_eq!(stored, vec![pair(so2.outcome_id)]);

  assert!(s.delete_outcome(OutcomeKind::Peo, peo.outcome_id).await.unwrap());
  assert!(s.so_peo_mappings(pid).await.unwrap().is_empty());
}

#[tokio::test]
async fn clo_so_mappings_are_scoped_to_course() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let other = s.create_course(course_input(cycle.cycle_id, "EECE 320")).await.unwrap().unwrap();
  let so = s
    .create_outcome(OutcomeKind::So, cycle.program_id, OutcomeInput { code: "SO 1".into(), description: "x".into() })
    .await
    .unwrap()
    .unwrap();
  let clo_a = s
    .create_outcome(OutcomeKind::Clo, course.course_id, OutcomeInput { code: "CLO 1".into(), description: "a".into() })
    .await
    .unwrap()
    .unwrap();
  let clo_b = s
    .create_outcome(OutcomeKind::Clo, other.course_id, OutcomeInput { code: "CLO 1".into(), description: "b".into() })
    .await
    .unwrap()
    .unwrap();

  s.replace_clo_so_mappings(other.course_id, vec![CloSoMapping { clo_id: clo_b.outcome_id, so_id: so.outcome_id }])
    .await
    .unwrap();
  s.replace_clo_so_mappings(course.course_id, vec![CloSoMapping { clo_id: clo_a.outcome_id, so_id: so.outcome_id }])
    .await
    .unwrap();

  assert_eq!(s.clo_so_mappings(course.course_id).await.unwrap().len(), 1);
  assert_eq!(s.clo_so_mappings(other.course_id).await.unwrap().len(), 1);
}

// ─── Faculty ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn faculty_profile_aggregates_rows_programs_and_sections() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let course = s.create_course(course_input(cycle.cycle_id, "EECE 310")).await.unwrap().unwrap();
  let id = faculty(&s, "a@example.edu").await;
  s.create_syllabus_section(course.course_id, id, "Fall 2025".into()).await.unwrap().unwrap();

  let programs = s.replace_faculty_programs(id, vec![cycle.program_id, cycle.program_id]).await.unwrap().unwrap();
  assert_eq!(programs.len(), 1);

  let records: FacultyRecords = serde_json::from_value(json!({
    "qualifications": [ { "degree": "PhD", "year": "2012" } ],
    "consulting": [ { "client": "Telecom operator" } ]
  }))
  .unwrap();
  let profile = s.save_faculty_profile(id, None, records).await.unwrap().unwrap();
  assert_eq!(profile.records.qualifications.len(), 1);
  assert_eq!(profile.records.consulting.len(), 1);
  assert_eq!(profile.programs.len(), 1);
  assert_eq!(profile.sections.len(), 1);
  assert_eq!(profile.sections[0].course_code, "EECE 310");

  assert!(s.faculty_email_taken("A@EXAMPLE.EDU".into(), None).await.unwrap());
  assert!(s.delete_faculty(id).await.unwrap());
  assert_eq!(s.count("instructor_syllabi").await.unwrap(), 0);
  assert_eq!(s.count("faculty_rows").await.unwrap(), 0);
}

// ─── Accounts and evidence ───────────────────────────────────────────────────

#[tokio::test]
async fn upsert_user_creates_then_updates() {
  let s = store().await;
  let created = s.upsert_user("Admin@Example.edu".into(), "plain".into(), "admin".into()).await.unwrap();
  assert_eq!(created.email, "admin@example.edu");
  assert_eq!(created.role_name, "admin");

  let updated = s.upsert_user("admin@example.edu".into(), "$argon2id$x".into(), "admin".into()).await.unwrap();
  assert_eq!(updated.user_id, created.user_id);
  assert_eq!(updated.password_hash, "$argon2id$x");

  assert!(s.set_password_hash(created.user_id, "$argon2id$y".into()).await.unwrap());
  let found = s.find_user_by_email("ADMIN@example.edu".into()).await.unwrap().unwrap();
  assert_eq!(found.password_hash, "$argon2id$y");
}

#[tokio::test]
async fn evidence_is_scoped_to_cycle() {
  let s = store().await;
  let cycle = program_and_cycle(&s).await;
  let user = s.upsert_user("admin@example.edu".into(), "x".into(), "admin".into()).await.unwrap();

  let file = s
    .create_evidence(cycle.cycle_id, user.user_id, NewEvidence {
      file_name:   "lab-safety-audit.pdf".into(),
      file_type:   "pdf".into(),
      upload_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(s.list_evidence(cycle.cycle_id).await.unwrap(), vec![file.clone()]);
  assert!(s.create_evidence(999, user.user_id, NewEvidence {
    file_name:   "x".into(),
    file_type:   "y".into(),
    upload_date: file.upload_date,
  }).await.unwrap().is_none());

  assert!(s.delete_cycle(cycle.cycle_id).await.unwrap());
  assert!(s.get_evidence(file.evidence_id).await.unwrap().is_none());
}
