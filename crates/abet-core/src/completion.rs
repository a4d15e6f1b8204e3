//! Per-section completion calculators.
//!
//! Each section has a fixed list of checks. Completion is
//! `round(100 × filled / total)`; a section with no checks is 0 %.
//! Sections graded by row add every row's own checks on top of the
//! "collection is non-empty" check, so adding an unfilled row can lower the
//! percentage but filling fields never does.

use crate::section::{
  AppendixACourseSyllabi, AppendixBFacultyVitae, AppendixCEquipment,
  AppendixDInstitution, BackgroundInfo, Criterion1Students, Criterion2Peos,
  Criterion3Outcomes, Criterion4Improvement, Criterion5Curriculum,
  Criterion6Faculty, Criterion7Facilities, Criterion8Support, RowCollection,
  SectionFields, SectionRow,
};

/// Running count of filled versus counted checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  pub filled: u32,
  pub total:  u32,
}

impl Tally {
  pub fn check(&mut self, filled: bool) {
    self.total += 1;
    if filled {
      self.filled += 1;
    }
  }

  /// Filled iff non-empty after trimming.
  pub fn text(&mut self, value: &str) { self.check(!value.trim().is_empty()); }

  /// Filled iff present and strictly positive. A recorded zero counts as
  /// incomplete.
  pub fn number(&mut self, value: Option<f64>) {
    self.check(value.is_some_and(|v| v > 0.0));
  }

  pub fn count(&mut self, value: Option<i64>) {
    self.check(value.is_some_and(|v| v > 0));
  }

  pub fn date(&mut self, value: Option<&str>) {
    self.check(value.is_some_and(|v| !v.trim().is_empty()));
  }

  pub fn texts<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) {
    for value in values {
      self.text(value);
    }
  }

  pub fn percent(self) -> f64 {
    if self.total == 0 {
      return 0.0;
    }
    (100.0 * f64::from(self.filled) / f64::from(self.total)).round()
  }
}

fn has_rows(rows: &[SectionRow], collection: RowCollection) -> bool {
  rows.iter().any(|r| r.collection() == collection)
}

/// Per-row checks for collections graded row by row. Collections that only
/// need to be non-empty add nothing here.
fn grade_row(tally: &mut Tally, row: &SectionRow) {
  match row {
    SectionRow::Curriculum(r) => {
      tally.texts([r.course_label.as_str(), &r.r_se_category, &r.last_two_terms_offered]);
      let credits = [
        r.math_basic_sciences_credits,
        r.engineering_topics_credits,
        r.other_credits,
      ];
      tally.check(credits.iter().any(|c| c.is_some_and(|v| v > 0.0)));
    }
    SectionRow::Classroom(r) => {
      tally.text(&r.classroom_room);
      tally.count(r.classroom_capacity);
      tally.texts([r.classroom_multimedia.as_str(), &r.classroom_typical_use]);
    }
    SectionRow::Laboratory(r) => {
      tally.texts([
        r.lab_name.as_str(),
        &r.lab_room,
        &r.lab_category,
        &r.lab_hardware_list,
        &r.lab_software_list,
      ]);
    }
    SectionRow::ComputingResource(r) => {
      tally.texts([
        r.computing_resource_name.as_str(),
        &r.computing_resource_location,
        &r.computing_access_type,
      ]);
    }
    SectionRow::UpgradingFacility(r) => {
      tally.text(&r.facility_name);
      tally.date(r.last_upgrade_date.as_deref());
      tally.date(r.next_scheduled_upgrade.as_deref());
    }
    SectionRow::Staffing(r) => {
      tally.text(&r.category);
      tally.count(r.number_of_staff);
      tally.text(&r.primary_role);
    }
    SectionRow::Equipment(r) => {
      tally.texts([r.equipment_name.as_str(), &r.category, &r.location_lab]);
      tally.count(r.quantity);
      tally.text(&r.instructional_use);
    }
    SectionRow::SupportUnit(r) => {
      tally.texts([
        r.unit_name.as_str(),
        &r.responsible_name,
        &r.responsible_title,
      ]);
      tally.check(!r.phone.trim().is_empty() || !r.email.trim().is_empty());
    }
    SectionRow::Enrollment(_) | SectionRow::DesignProject(_) => {}
  }
}

fn background(t: &mut Tally, f: &BackgroundInfo) {
  t.texts([
    f.program_contact_name.as_str(),
    &f.contact_title,
    &f.office_location,
    &f.phone_number,
    &f.email_address,
  ]);
  t.date(f.year_implemented.as_deref());
  t.date(f.last_general_review_date.as_deref());
  t.text(&f.summary_of_major_changes);
}

fn criterion1(t: &mut Tally, f: &Criterion1Students) {
  t.texts([
    f.admission_requirements.as_str(),
    &f.transfer_credit_policy,
    &f.advising_and_career_guidance,
    &f.work_in_lieu_of_courses,
    &f.graduation_requirements,
    &f.transcript_degree_title,
    &f.performance_evaluation_process,
  ]);
}

fn criterion2(t: &mut Tally, f: &Criterion2Peos) {
  t.texts([
    f.institutional_mission_statement.as_str(),
    &f.program_mission_statement,
    &f.mission_source_link,
    &f.peos_list,
    &f.peos_short_descriptions,
    &f.peos_publication_location,
    &f.peos_mission_alignment_explanation,
    &f.constituencies_list,
    &f.constituencies_contribution_description,
    &f.peo_review_frequency,
    &f.peo_review_participants,
    &f.feedback_collection_and_decision_process,
    &f.changes_since_last_peo_review,
  ]);
}

fn criterion3(t: &mut Tally, f: &Criterion3Outcomes) {
  t.texts([
    f.outcomes_publication_location.as_str(),
    &f.so_peo_relationship_explanation,
  ]);
}

fn criterion4(t: &mut Tally, f: &Criterion4Improvement) {
  t.texts([
    f.assessment_processes_description.as_str(),
    &f.assessment_frequency,
    &f.expected_attainment_levels,
    &f.results_summary,
    &f.results_documentation_location,
    &f.improvement_actions_description,
  ]);
}

fn criterion5(t: &mut Tally, f: &Criterion5Curriculum) {
  t.texts([
    f.academic_calendar_type.as_str(),
    &f.program_curriculum_description,
    &f.prerequisite_flowchart_description,
    &f.curriculum_alignment_peos,
    &f.curriculum_alignment_sos,
    &f.culminating_design_experience,
    &f.cooperative_education_description,
    &f.materials_available_description,
  ]);
}

fn criterion6(t: &mut Tally, f: &Criterion6Faculty) {
  t.texts([
    f.faculty_qualifications_description.as_str(),
    &f.faculty_workload_description,
    &f.faculty_size_adequacy,
    &f.professional_development_description,
    &f.authority_and_responsibility,
  ]);
}

fn criterion7(t: &mut Tally, f: &Criterion7Facilities) {
  t.count(f.total_number_of_offices);
  t.number(f.average_workspace_size);
  t.texts([
    f.guidance_description.as_str(),
    &f.responsible_faculty_name,
    &f.maintenance_policy_description,
    &f.technical_collections_and_journals,
    &f.electronic_databases_and_eresources,
    &f.faculty_book_request_process,
    &f.library_access_hours_and_systems,
    &f.facilities_support_student_outcomes,
    &f.safety_and_inspection_processes,
    &f.compliance_with_university_policy,
    &f.student_availability_details,
  ]);
}

fn criterion8(t: &mut Tally, f: &Criterion8Support) {
  t.texts([
    f.leadership_structure_description.as_str(),
    &f.leadership_adequacy_description,
    &f.leadership_participation_description,
    &f.budget_process_continuity,
    &f.teaching_support_description,
    &f.infrastructure_funding_description,
    &f.resource_adequacy_description,
    &f.hiring_process_description,
    &f.retention_strategies_description,
    &f.professional_development_support_types,
    &f.professional_development_request_process,
    &f.professional_development_funding_details,
  ]);
}

fn appendix_a(t: &mut Tally, f: &AppendixACourseSyllabi) {
  t.texts([f.syllabus_format_notes.as_str(), &f.syllabi_location]);
}

fn appendix_b(t: &mut Tally, f: &AppendixBFacultyVitae) {
  t.texts([f.vitae_format_notes.as_str(), &f.vitae_location]);
}

fn appendix_c(t: &mut Tally, f: &AppendixCEquipment) {
  t.count(f.labs_covered_count);
  t.count(f.high_value_assets_count);
}

fn appendix_d(t: &mut Tally, f: &AppendixDInstitution) {
  t.texts([
    f.institution_name.as_str(),
    &f.institution_address,
    &f.chief_executive_name,
    &f.chief_executive_title,
    &f.self_study_submitter_name,
    &f.self_study_submitter_title,
    &f.institutional_accreditations,
    &f.control_type,
    &f.credit_unit_definition,
  ]);
}

/// Tally a section's narrative fields and rows.
pub fn section_tally(fields: &SectionFields, rows: &[SectionRow]) -> Tally {
  let mut t = Tally::default();
  match fields {
    SectionFields::Background(f) => background(&mut t, f),
    SectionFields::Criterion1(f) => criterion1(&mut t, f),
    SectionFields::Criterion2(f) => criterion2(&mut t, f),
    SectionFields::Criterion3(f) => criterion3(&mut t, f),
    SectionFields::Criterion4(f) => criterion4(&mut t, f),
    SectionFields::Criterion5(f) => criterion5(&mut t, f),
    SectionFields::Criterion6(f) => criterion6(&mut t, f),
    SectionFields::Criterion7(f) => criterion7(&mut t, f),
    SectionFields::Criterion8(f) => criterion8(&mut t, f),
    SectionFields::AppendixA(f) => appendix_a(&mut t, f),
    SectionFields::AppendixB(f) => appendix_b(&mut t, f),
    SectionFields::AppendixC(f) => appendix_c(&mut t, f),
    SectionFields::AppendixD(f) => appendix_d(&mut t, f),
  }

  for collection in fields.section().collections() {
    t.check(has_rows(rows, *collection));
  }
  for row in rows {
    grade_row(&mut t, row);
  }
  t
}

/// Completion percentage of a section, 0–100.
pub fn section_completion(fields: &SectionFields, rows: &[SectionRow]) -> f64 {
  section_tally(fields, rows).percent()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::section::{
    EquipmentRow, Section, StaffingRow,
  };

  #[test]
  fn empty_sections_are_zero() {
    for section in [Section::Background, Section::Criterion7, Section::AppendixD] {
      assert_eq!(section_completion(&SectionFields::empty(section), &[]), 0.0);
    }
  }

  #[test]
  fn zero_checks_is_zero() {
    assert_eq!(Tally::default().percent(), 0.0);
  }

  #[test]
  fn half_filled_criterion3() {
    let fields = SectionFields::Criterion3(Criterion3Outcomes {
      outcomes_publication_location:   "Department website".into(),
      so_peo_relationship_explanation: "   ".into(),
    });
    assert_eq!(section_completion(&fields, &[]), 50.0);
  }

  #[test]
  fn fully_filled_appendix_c_is_exactly_100() {
    let fields = SectionFields::AppendixC(AppendixCEquipment {
      labs_covered_count:      Some(4),
      high_value_assets_count: Some(2),
    });
    let rows = vec![SectionRow::Equipment(EquipmentRow {
      equipment_name:    "Spectrum analyser".into(),
      category:          "RF".into(),
      quantity:          Some(3),
      location_lab:      "E-204".into(),
      instructional_use: "EECE 310 labs".into(),
      ..Default::default()
    })];
    assert_eq!(section_completion(&fields, &rows), 100.0);
  }

  #[test]
  fn zero_counts_as_incomplete() {
    let fields = SectionFields::AppendixC(AppendixCEquipment {
      labs_covered_count:      Some(0),
      high_value_assets_count: Some(5),
    });
    // checks: labs, assets, equipment_rows non-empty
    assert_eq!(section_tally(&fields, &[]), Tally { filled: 1, total: 3 });
  }

  #[test]
  fn filling_row_fields_never_lowers_completion() {
    let fields = SectionFields::empty(Section::Criterion8);
    let mut row = StaffingRow::default();
    let mut last = section_completion(&fields, &[SectionRow::Staffing(row.clone())]);
    for step in 0..3 {
      match step {
        0 => row.category = "Technical".into(),
        1 => row.number_of_staff = Some(3),
        _ => row.primary_role = "Lab support".into(),
      }
      let now = section_completion(&fields, &[SectionRow::Staffing(row.clone())]);
      assert!(now >= last);
      last = now;
    }
  }
}
