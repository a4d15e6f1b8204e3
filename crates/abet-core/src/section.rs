//! Section records, the narrative record kept per cycle for Background
//! Information, Criteria 1-8 and Appendices A-D, and the row-collections
//! each of them owns.
//!
//! Every field is optional on input so partially-filled drafts can be saved.
//! Narrative fields are stored as one JSON document per record; rows are
//! stored one per line, tagged with their collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumString};

use crate::{
  Result,
  slot::CriterionSlot,
  validate::{self, DateRule, FieldErrors, row_field},
};

// ─── Tags ────────────────────────────────────────────────────────────────────

/// The record kinds a cycle can hold. The lowercase tag doubles as the URL
/// segment (`/cycles/{id}/criterion7`, `/cycles/{id}/appendixc`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Section {
  Background,
  Criterion1,
  Criterion2,
  Criterion3,
  Criterion4,
  Criterion5,
  Criterion6,
  Criterion7,
  Criterion8,
  AppendixA,
  AppendixB,
  AppendixC,
  AppendixD,
}

impl Section {
  pub fn slot(self) -> CriterionSlot {
    match self {
      Self::Background => CriterionSlot::Background,
      Self::Criterion1 => CriterionSlot::Criterion1,
      Self::Criterion2 => CriterionSlot::Criterion2,
      Self::Criterion3 => CriterionSlot::Criterion3,
      Self::Criterion4 => CriterionSlot::Criterion4,
      Self::Criterion5 => CriterionSlot::Criterion5,
      Self::Criterion6 => CriterionSlot::Criterion6,
      Self::Criterion7 => CriterionSlot::Criterion7,
      Self::Criterion8 => CriterionSlot::Criterion8,
      Self::AppendixA | Self::AppendixB | Self::AppendixC | Self::AppendixD => {
        CriterionSlot::Appendices
      }
    }
  }

  /// Appendices share one slot, so each keeps its own checklist item rather
  /// than adopting the slot's default one.
  pub fn adopts_default_item(self) -> bool {
    self.slot() != CriterionSlot::Appendices
  }

  /// Name of the checklist item created for this section when none exists.
  pub fn item_name(self) -> &'static str {
    match self {
      Self::AppendixA => "Appendix A - Course Syllabi",
      Self::AppendixB => "Appendix B - Faculty Vitae",
      Self::AppendixC => "Appendix C - Equipment",
      Self::AppendixD => "Appendix D - Institutional Summary",
      other => other.slot().default_item_name(),
    }
  }

  /// The row-collections owned by this section's record.
  pub fn collections(self) -> &'static [RowCollection] {
    use RowCollection::*;
    match self {
      Self::Criterion1 => &[EnrollmentRows],
      Self::Criterion5 => &[Table51Rows, DesignProjectRows],
      Self::Criterion7 => &[
        Classrooms,
        Laboratories,
        ComputingResources,
        UpgradingFacilities,
      ],
      Self::Criterion8 => &[StaffingRows],
      Self::AppendixC => &[EquipmentRows],
      Self::AppendixD => &[SupportUnitRows],
      _ => &[],
    }
  }
}

/// Tag of a row-collection; also the JSON key the rows travel under.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowCollection {
  EnrollmentRows,
  #[serde(rename = "table_5_1_rows")]
  #[strum(serialize = "table_5_1_rows")]
  Table51Rows,
  DesignProjectRows,
  Classrooms,
  Laboratories,
  ComputingResources,
  UpgradingFacilities,
  StaffingRows,
  EquipmentRows,
  SupportUnitRows,
}

// ─── Lenient decoding ────────────────────────────────────────────────────────

mod lenient {
  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  /// Accept a year (or similar code) given either as a JSON string or a
  /// JSON number.
  pub fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<Value>::deserialize(d)? {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) => Some(s),
      Some(Value::Number(n)) => Some(n.to_string()),
      Some(other) => {
        return Err(serde::de::Error::custom(format!(
          "expected a string or number, got {other}"
        )));
      }
    })
  }
}

// ─── Narrative field sets ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundInfo {
  pub program_contact_name:     String,
  pub contact_title:            String,
  pub office_location:          String,
  pub phone_number:             String,
  pub email_address:            String,
  #[serde(deserialize_with = "lenient::opt_string")]
  pub year_implemented:         Option<String>,
  pub last_general_review_date: Option<String>,
  pub summary_of_major_changes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion1Students {
  pub admission_requirements:         String,
  pub transfer_credit_policy:         String,
  pub advising_and_career_guidance:   String,
  pub work_in_lieu_of_courses:        String,
  pub graduation_requirements:        String,
  pub transcript_degree_title:        String,
  pub performance_evaluation_process: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion2Peos {
  pub institutional_mission_statement:          String,
  pub program_mission_statement:                String,
  pub mission_source_link:                      String,
  pub peos_list:                                String,
  pub peos_short_descriptions:                  String,
  pub peos_publication_location:                String,
  pub peos_mission_alignment_explanation:       String,
  pub constituencies_list:                      String,
  pub constituencies_contribution_description:  String,
  pub peo_review_frequency:                     String,
  pub peo_review_participants:                  String,
  pub feedback_collection_and_decision_process: String,
  pub changes_since_last_peo_review:            String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion3Outcomes {
  pub outcomes_publication_location:   String,
  pub so_peo_relationship_explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion4Improvement {
  pub assessment_processes_description: String,
  pub assessment_frequency:             String,
  pub expected_attainment_levels:       String,
  pub results_summary:                  String,
  pub results_documentation_location:   String,
  pub improvement_actions_description:  String,
  pub additional_information:           String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion5Curriculum {
  pub academic_calendar_type:            String,
  pub program_curriculum_description:    String,
  pub prerequisite_flowchart_description: String,
  pub curriculum_alignment_peos:         String,
  pub curriculum_alignment_sos:          String,
  pub culminating_design_experience:     String,
  pub cooperative_education_description: String,
  pub materials_available_description:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion6Faculty {
  pub faculty_qualifications_description: String,
  pub faculty_workload_description:       String,
  pub faculty_size_adequacy:              String,
  pub professional_development_description: String,
  pub authority_and_responsibility:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion7Facilities {
  pub total_number_of_offices:             Option<i64>,
  pub average_workspace_size:              Option<f64>,
  pub guidance_description:                String,
  pub responsible_faculty_name:            String,
  pub maintenance_policy_description:      String,
  pub technical_collections_and_journals:  String,
  pub electronic_databases_and_eresources: String,
  pub faculty_book_request_process:        String,
  pub library_access_hours_and_systems:    String,
  pub facilities_support_student_outcomes: String,
  pub safety_and_inspection_processes:     String,
  pub compliance_with_university_policy:   String,
  pub student_availability_details:        String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criterion8Support {
  pub leadership_structure_description:         String,
  pub leadership_adequacy_description:          String,
  pub leadership_participation_description:     String,
  pub budget_process_continuity:                String,
  pub teaching_support_description:             String,
  pub infrastructure_funding_description:       String,
  pub resource_adequacy_description:            String,
  pub hiring_process_description:               String,
  pub retention_strategies_description:         String,
  pub professional_development_support_types:   String,
  pub professional_development_request_process: String,
  pub professional_development_funding_details: String,
  pub additional_narrative_on_staffing:         String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixACourseSyllabi {
  pub syllabus_format_notes: String,
  pub syllabi_location:      String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixBFacultyVitae {
  pub vitae_format_notes: String,
  pub vitae_location:     String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixCEquipment {
  pub labs_covered_count:      Option<i64>,
  pub high_value_assets_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixDInstitution {
  pub institution_name:                 String,
  pub institution_address:              String,
  pub chief_executive_name:             String,
  pub chief_executive_title:            String,
  pub self_study_submitter_name:        String,
  pub self_study_submitter_title:       String,
  pub institutional_accreditations:     String,
  pub control_type:                     String,
  pub credit_unit_definition:           String,
  pub non_academic_support_description: String,
}

/// The typed narrative of one record. The variant is the section tag stored
/// alongside the JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "fields", rename_all = "lowercase")]
pub enum SectionFields {
  Background(BackgroundInfo),
  Criterion1(Criterion1Students),
  Criterion2(Criterion2Peos),
  Criterion3(Criterion3Outcomes),
  Criterion4(Criterion4Improvement),
  Criterion5(Criterion5Curriculum),
  Criterion6(Criterion6Faculty),
  Criterion7(Criterion7Facilities),
  Criterion8(Criterion8Support),
  AppendixA(AppendixACourseSyllabi),
  AppendixB(AppendixBFacultyVitae),
  AppendixC(AppendixCEquipment),
  AppendixD(AppendixDInstitution),
}

impl SectionFields {
  pub fn section(&self) -> Section {
    match self {
      Self::Background(_) => Section::Background,
      Self::Criterion1(_) => Section::Criterion1,
      Self::Criterion2(_) => Section::Criterion2,
      Self::Criterion3(_) => Section::Criterion3,
      Self::Criterion4(_) => Section::Criterion4,
      Self::Criterion5(_) => Section::Criterion5,
      Self::Criterion6(_) => Section::Criterion6,
      Self::Criterion7(_) => Section::Criterion7,
      Self::Criterion8(_) => Section::Criterion8,
      Self::AppendixA(_) => Section::AppendixA,
      Self::AppendixB(_) => Section::AppendixB,
      Self::AppendixC(_) => Section::AppendixC,
      Self::AppendixD(_) => Section::AppendixD,
    }
  }

  /// A blank record, as auto-created on first read.
  pub fn empty(section: Section) -> Self {
    match section {
      Section::Background => Self::Background(Default::default()),
      Section::Criterion1 => Self::Criterion1(Default::default()),
      Section::Criterion2 => Self::Criterion2(Default::default()),
      Section::Criterion3 => Self::Criterion3(Default::default()),
      Section::Criterion4 => Self::Criterion4(Default::default()),
      Section::Criterion5 => Self::Criterion5(Default::default()),
      Section::Criterion6 => Self::Criterion6(Default::default()),
      Section::Criterion7 => Self::Criterion7(Default::default()),
      Section::Criterion8 => Self::Criterion8(Default::default()),
      Section::AppendixA => Self::AppendixA(Default::default()),
      Section::AppendixB => Self::AppendixB(Default::default()),
      Section::AppendixC => Self::AppendixC(Default::default()),
      Section::AppendixD => Self::AppendixD(Default::default()),
    }
  }

  /// Serialise the inner payload (without the tag) for the `fields_json`
  /// column.
  pub fn to_json(&self) -> Result<Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("fields").cloned().unwrap_or(Value::Null))
  }

  /// Deserialise from the section tag and the JSON payload.
  pub fn from_parts(section: Section, data: Value) -> Result<Self> {
    Ok(Self::decode(section, data)?)
  }

  /// As [`Self::from_parts`], with type errors keyed by field name.
  pub fn decode(section: Section, data: Value) -> Result<Self, FieldErrors> {
    use validate::decode;
    Ok(match section {
      Section::Background => Self::Background(decode(data)?),
      Section::Criterion1 => Self::Criterion1(decode(data)?),
      Section::Criterion2 => Self::Criterion2(decode(data)?),
      Section::Criterion3 => Self::Criterion3(decode(data)?),
      Section::Criterion4 => Self::Criterion4(decode(data)?),
      Section::Criterion5 => Self::Criterion5(decode(data)?),
      Section::Criterion6 => Self::Criterion6(decode(data)?),
      Section::Criterion7 => Self::Criterion7(decode(data)?),
      Section::Criterion8 => Self::Criterion8(decode(data)?),
      Section::AppendixA => Self::AppendixA(decode(data)?),
      Section::AppendixB => Self::AppendixB(decode(data)?),
      Section::AppendixC => Self::AppendixC(decode(data)?),
      Section::AppendixD => Self::AppendixD(decode(data)?),
    })
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentRow {
  pub academic_year: String,
  pub full_time:     Option<i64>,
  pub part_time:     Option<i64>,
  pub graduates:     Option<i64>,
}

/// One line of Table 5-1 (curriculum).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumRow {
  pub recommended_schedule:        String,
  pub course_label:                String,
  /// `R` (required), `SE` (selected elective) or `E` (elective).
  pub r_se_category:               String,
  pub math_basic_sciences_credits: Option<f64>,
  pub engineering_topics_credits:  Option<f64>,
  pub other_credits:               Option<f64>,
  pub last_two_terms_offered:      String,
  pub max_section_enrollment:      Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignProjectRow {
  pub project_title:   String,
  pub team_identifier: String,
  #[serde(deserialize_with = "lenient::opt_string")]
  pub year:            Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomRow {
  pub classroom_room:              String,
  pub classroom_capacity:          Option<i64>,
  pub classroom_multimedia:        String,
  pub classroom_internet_access:   String,
  pub classroom_typical_use:       String,
  pub classroom_adequacy_comments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaboratoryRow {
  pub lab_name:              String,
  pub lab_room:              String,
  pub lab_category:          String,
  pub lab_hardware_list:     String,
  pub lab_software_list:     String,
  pub lab_open_hours:        String,
  pub lab_courses_using_lab: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputingResourceRow {
  pub computing_resource_name:     String,
  pub computing_resource_location: String,
  pub computing_adequacy_notes:    String,
  pub computing_hours_available:   String,
  pub computing_access_type:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradingFacilityRow {
  pub facility_name:          String,
  pub next_scheduled_upgrade: Option<String>,
  pub last_upgrade_date:      Option<String>,
  pub maintenance_notes:      String,
  pub responsible_staff:      String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingRow {
  pub category:                     String,
  pub number_of_staff:              Option<i64>,
  pub primary_role:                 String,
  pub training_retention_practices: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentRow {
  pub equipment_name:    String,
  pub category:          String,
  pub quantity:          Option<i64>,
  pub location_lab:      String,
  pub instructional_use: String,
  pub last_service_date: Option<String>,
  pub evidence_link:     String,
}

/// An academic or non-academic support unit listed in Appendix D.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportUnitRow {
  pub unit_name:         String,
  pub responsible_name:  String,
  pub responsible_title: String,
  pub phone:             String,
  pub email:             String,
}

/// A row payload; the variant is the collection tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "data")]
pub enum SectionRow {
  #[serde(rename = "enrollment_rows")]
  Enrollment(EnrollmentRow),
  #[serde(rename = "table_5_1_rows")]
  Curriculum(CurriculumRow),
  #[serde(rename = "design_project_rows")]
  DesignProject(DesignProjectRow),
  #[serde(rename = "classrooms")]
  Classroom(ClassroomRow),
  #[serde(rename = "laboratories")]
  Laboratory(LaboratoryRow),
  #[serde(rename = "computing_resources")]
  ComputingResource(ComputingResourceRow),
  #[serde(rename = "upgrading_facilities")]
  UpgradingFacility(UpgradingFacilityRow),
  #[serde(rename = "staffing_rows")]
  Staffing(StaffingRow),
  #[serde(rename = "equipment_rows")]
  Equipment(EquipmentRow),
  #[serde(rename = "support_unit_rows")]
  SupportUnit(SupportUnitRow),
}

impl SectionRow {
  pub fn collection(&self) -> RowCollection {
    match self {
      Self::Enrollment(_) => RowCollection::EnrollmentRows,
      Self::Curriculum(_) => RowCollection::Table51Rows,
      Self::DesignProject(_) => RowCollection::DesignProjectRows,
      Self::Classroom(_) => RowCollection::Classrooms,
      Self::Laboratory(_) => RowCollection::Laboratories,
      Self::ComputingResource(_) => RowCollection::ComputingResources,
      Self::UpgradingFacility(_) => RowCollection::UpgradingFacilities,
      Self::Staffing(_) => RowCollection::StaffingRows,
      Self::Equipment(_) => RowCollection::EquipmentRows,
      Self::SupportUnit(_) => RowCollection::SupportUnitRows,
    }
  }

  pub fn to_json(&self) -> Result<Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(Value::Null))
  }

  pub fn from_parts(collection: RowCollection, data: Value) -> Result<Self> {
    Ok(Self::decode(collection, data)?)
  }

  pub fn decode(collection: RowCollection, data: Value) -> Result<Self, FieldErrors> {
    use validate::decode;
    Ok(match collection {
      RowCollection::EnrollmentRows => Self::Enrollment(decode(data)?),
      RowCollection::Table51Rows => Self::Curriculum(decode(data)?),
      RowCollection::DesignProjectRows => Self::DesignProject(decode(data)?),
      RowCollection::Classrooms => Self::Classroom(decode(data)?),
      RowCollection::Laboratories => Self::Laboratory(decode(data)?),
      RowCollection::ComputingResources => Self::ComputingResource(decode(data)?),
      RowCollection::UpgradingFacilities => Self::UpgradingFacility(decode(data)?),
      RowCollection::StaffingRows => Self::Staffing(decode(data)?),
      RowCollection::EquipmentRows => Self::Equipment(decode(data)?),
      RowCollection::SupportUnitRows => Self::SupportUnit(decode(data)?),
    })
  }

  fn validate(&mut self, errors: &mut FieldErrors, index: usize, today: NaiveDate) {
    let key = self.collection();
    let field = |name: &str| row_field(key.as_ref(), index, name);
    match self {
      Self::DesignProject(row) => {
        if let Some(year) = row.year.as_deref().filter(|y| !validate::is_blank(y)) {
          validate::year(errors, &field("year"), year, today);
        } else {
          row.year = None;
        }
      }
      Self::Curriculum(row) => {
        for (name, value) in [
          ("math_basic_sciences_credits", row.math_basic_sciences_credits),
          ("engineering_topics_credits", row.engineering_topics_credits),
          ("other_credits", row.other_credits),
        ] {
          if let Some(v) = value {
            validate::non_negative(errors, &field(name), v);
          }
        }
      }
      Self::UpgradingFacility(row) => {
        validate::normalize_date(
          errors,
          &field("next_scheduled_upgrade"),
          &mut row.next_scheduled_upgrade,
          today,
          DateRule::Any,
        );
        validate::normalize_date(
          errors,
          &field("last_upgrade_date"),
          &mut row.last_upgrade_date,
          today,
          DateRule::NotFuture,
        );
      }
      Self::Staffing(row) => {
        if let Some(n) = row.number_of_staff {
          validate::non_negative(errors, &field("number_of_staff"), n as f64);
        }
      }
      Self::Equipment(row) => {
        if let Some(q) = row.quantity {
          validate::non_negative(errors, &field("quantity"), q as f64);
        }
        validate::normalize_date(
          errors,
          &field("last_service_date"),
          &mut row.last_service_date,
          today,
          DateRule::NotFuture,
        );
      }
      Self::SupportUnit(row) => {
        validate::normalize_phone(errors, &field("phone"), &mut row.phone);
        if !validate::is_blank(&row.email) {
          validate::email(errors, &field("email"), &row.email);
        }
      }
      Self::Enrollment(_)
      | Self::Classroom(_)
      | Self::Laboratory(_)
      | Self::ComputingResource(_) => {}
    }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A complete section submission: narrative fields plus every owned row.
/// Saving replaces all existing rows of the record.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPayload {
  pub fields: SectionFields,
  pub rows:   Vec<SectionRow>,
}

/// Keys a client may echo back from a previous GET.
const READ_ONLY_KEYS: [&str; 6] = [
  "record_id",
  "cycle_id",
  "section",
  "completion_percentage",
  "updated_at",
  "checklist_item_id",
];
const ROW_META_KEYS: [&str; 2] = ["row_id", "position"];

const MSG_UNKNOWN_FIELD: &str = "Unknown field.";

fn strip_nulls(value: Value) -> Value {
  match value {
    Value::Object(map) => Value::Object(
      map
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k, strip_nulls(v)))
        .collect(),
    ),
    other => other,
  }
}

impl SectionPayload {
  pub fn empty(section: Section) -> Self {
    Self { fields: SectionFields::empty(section), rows: Vec::new() }
  }

  /// The stored contents of a record, as the base of a partial save.
  pub fn from_view(view: &SectionView) -> Self {
    Self {
      fields: view.record.fields.clone(),
      rows:   view.rows.iter().map(|stored| stored.row.clone()).collect(),
    }
  }

  pub fn section(&self) -> Section { self.fields.section() }

  /// Parse a body over a blank record.
  pub fn from_json(section: Section, body: Value) -> Result<Self, FieldErrors> {
    Self::empty(section).apply_json(body)
  }

  /// Overlay a submitted JSON object on this payload.
  ///
  /// Narrative keys replace only the fields they name; an explicit `null`
  /// resets a field to blank. A collection key replaces that collection's
  /// rows, and collections left out keep theirs. The `{"record": {...}}`
  /// wrapper of a GET response is unwrapped. Keys the section does not know
  /// are reported.
  pub fn apply_json(self, body: Value) -> Result<Self, FieldErrors> {
    let section = self.section();
    let Value::Object(mut object) = body else {
      return Err(FieldErrors::single(validate::NON_FIELD, "Expected a JSON object."));
    };

    let mut errors = FieldErrors::new();
    match object.remove("record") {
      Some(Value::Object(record)) => {
        for (key, value) in record {
          object.entry(key).or_insert(value);
        }
      }
      Some(Value::Null) | None => {}
      Some(_) => errors.add("record", "Expected a JSON object."),
    }
    for key in READ_ONLY_KEYS {
      object.remove(key);
    }

    let mut rows = self.rows;
    for collection in section.collections() {
      let Some(value) = object.remove(collection.as_ref()) else { continue };
      rows.retain(|row| row.collection() != *collection);
      let Value::Array(items) = value else {
        errors.add(collection.as_ref(), "Expected a list of rows.");
        continue;
      };
      for (index, item) in items.into_iter().enumerate() {
        let item = match strip_nulls(item) {
          Value::Object(mut map) => {
            for key in ROW_META_KEYS {
              map.remove(key);
            }
            Value::Object(map)
          }
          other => other,
        };
        match SectionRow::decode(*collection, item) {
          Ok(row) => rows.push(row),
          Err(e) => errors.merge(e.prefixed(&format!("{}[{index}].", collection.as_ref()))),
        }
      }
    }

    let mut fields = match self.fields.to_json() {
      Ok(Value::Object(map)) => map,
      _ => Map::new(),
    };
    for (key, value) in object {
      if !fields.contains_key(&key) {
        errors.add(key, MSG_UNKNOWN_FIELD);
      } else if value.is_null() {
        fields.remove(&key);
      } else {
        fields.insert(key, value);
      }
    }

    let fields = match SectionFields::decode(section, strip_nulls(Value::Object(fields))) {
      Ok(fields) => Some(fields),
      Err(e) => {
        errors.merge(e);
        None
      }
    };

    match fields {
      Some(fields) if errors.is_empty() => Ok(Self { fields, rows }),
      _ => Err(errors),
    }
  }

  /// Validate and normalise every field and row in place, collecting all
  /// problems.
  pub fn validate(&mut self, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match &mut self.fields {
      SectionFields::Background(info) => {
        validate::normalize_phone(&mut errors, "phone_number", &mut info.phone_number);
        if !validate::is_blank(&info.email_address) {
          validate::email(&mut errors, "email_address", &info.email_address);
        }
        match info.year_implemented.as_deref() {
          Some(y) if !validate::is_blank(y) => {
            validate::year(&mut errors, "year_implemented", y, today);
          }
          _ => info.year_implemented = None,
        }
        validate::normalize_date(
          &mut errors,
          "last_general_review_date",
          &mut info.last_general_review_date,
          today,
          DateRule::BeforeCurrentYear,
        );
      }
      SectionFields::Criterion7(facilities) => {
        if let Some(n) = facilities.total_number_of_offices {
          validate::non_negative(&mut errors, "total_number_of_offices", n as f64);
        }
        if let Some(size) = facilities.average_workspace_size {
          validate::non_negative(&mut errors, "average_workspace_size", size);
        }
      }
      SectionFields::AppendixC(equipment) => {
        for (name, value) in [
          ("labs_covered_count", equipment.labs_covered_count),
          ("high_value_assets_count", equipment.high_value_assets_count),
        ] {
          if let Some(v) = value {
            validate::non_negative(&mut errors, name, v as f64);
          }
        }
      }
      _ => {}
    }

    let mut counters = std::collections::HashMap::<RowCollection, usize>::new();
    for row in &mut self.rows {
      let index = counters.entry(row.collection()).or_default();
      row.validate(&mut errors, *index, today);
      *index += 1;
    }

    errors
  }
}

// ─── Stored forms ────────────────────────────────────────────────────────────

/// A persisted section record.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRecord {
  pub record_id:             i64,
  pub cycle_id:              i64,
  pub fields:                SectionFields,
  pub completion_percentage: f64,
  pub updated_at:            DateTime<Utc>,
}

/// A persisted row.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRow {
  pub row_id:   i64,
  pub position: i64,
  pub row:      SectionRow,
}

/// A record with its rows and the checklist item it reports to.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
  pub record:            SectionRecord,
  pub rows:              Vec<StoredRow>,
  pub checklist_item_id: Option<i64>,
}

impl SectionView {
  /// Wire form: record fields flattened beside the metadata, rows grouped
  /// under their collection keys.
  pub fn to_wire(&self) -> Result<Value> {
    let section = self.record.fields.section();
    let mut record = match self.record.fields.to_json()? {
      Value::Object(map) => map,
      _ => Map::new(),
    };
    record.insert("record_id".into(), self.record.record_id.into());
    record.insert("cycle_id".into(), self.record.cycle_id.into());
    record.insert("section".into(), section.as_ref().into());
    record.insert(
      "completion_percentage".into(),
      self.record.completion_percentage.into(),
    );
    record.insert("updated_at".into(), self.record.updated_at.to_rfc3339().into());

    let mut out = Map::new();
    out.insert("record".into(), Value::Object(record));
    for collection in section.collections() {
      let mut rows = Vec::new();
      for stored in self.rows.iter().filter(|r| r.row.collection() == *collection) {
        let mut row = match stored.row.to_json()? {
          Value::Object(map) => map,
          _ => Map::new(),
        };
        row.insert("row_id".into(), stored.row_id.into());
        row.insert("position".into(), stored.position.into());
        rows.push(Value::Object(row));
      }
      out.insert(collection.as_ref().into(), Value::Array(rows));
    }
    out.insert(
      "checklist_item_id".into(),
      self.checklist_item_id.map(Value::from).unwrap_or(Value::Null),
    );
    Ok(Value::Object(out))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 14).unwrap() }

  #[test]
  fn flat_body_splits_into_fields_and_rows() {
    let body = json!({
      "labs_covered_count": 6,
      "high_value_assets_count": null,
      "equipment_rows": [
        { "equipment_name": "Oscilloscope", "quantity": 12 },
        { "equipment_name": "FPGA kit", "last_service_date": null }
      ]
    });
    let payload = SectionPayload::from_json(Section::AppendixC, body).unwrap();
    let SectionFields::AppendixC(fields) = &payload.fields else {
      panic!("wrong variant");
    };
    assert_eq!(fields.labs_covered_count, Some(6));
    assert_eq!(fields.high_value_assets_count, None);
    assert_eq!(payload.rows.len(), 2);
    assert!(payload.rows.iter().all(|r| r.collection() == RowCollection::EquipmentRows));
  }

  #[test]
  fn foreign_collection_keys_are_unknown_fields() {
    // Criterion 2 owns no rows.
    let body = json!({ "peos_list": "PEO 1", "equipment_rows": [] });
    let errors = SectionPayload::from_json(Section::Criterion2, body).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("equipment_rows").unwrap(), [MSG_UNKNOWN_FIELD]);
  }

  #[test]
  fn malformed_rows_are_reported_by_index() {
    let body = json!({ "staffing_rows": [ {}, { "number_of_staff": "many" } ] });
    let errors = SectionPayload::from_json(Section::Criterion8, body).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains("staffing_rows[1].number_of_staff"));
  }

  #[test]
  fn mistyped_fields_are_keyed_by_name() {
    let body = json!({ "labs_covered_count": "six" });
    let errors = SectionPayload::from_json(Section::AppendixC, body).unwrap_err();
    assert!(errors.contains("labs_covered_count"));
  }

  fn saved_appendix_c() -> SectionPayload {
    SectionPayload::from_json(
      Section::AppendixC,
      json!({
        "labs_covered_count": 6,
        "high_value_assets_count": 2,
        "equipment_rows": [ { "equipment_name": "Oscilloscope", "quantity": 12 } ]
      }),
    )
    .unwrap()
  }

  #[test]
  fn partial_body_keeps_omitted_fields_and_rows() {
    let payload = saved_appendix_c().apply_json(json!({ "labs_covered_count": 7 })).unwrap();
    let SectionFields::AppendixC(fields) = &payload.fields else { panic!() };
    assert_eq!(fields.labs_covered_count, Some(7));
    assert_eq!(fields.high_value_assets_count, Some(2));
    assert_eq!(payload.rows.len(), 1);

    let cleared = payload
      .apply_json(json!({ "high_value_assets_count": null, "equipment_rows": [] }))
      .unwrap();
    let SectionFields::AppendixC(fields) = &cleared.fields else { panic!() };
    assert_eq!(fields.labs_covered_count, Some(7));
    assert_eq!(fields.high_value_assets_count, None);
    assert!(cleared.rows.is_empty());
  }

  #[test]
  fn echoed_get_body_is_accepted_unchanged() {
    let saved = saved_appendix_c();
    let view = SectionView {
      record:            SectionRecord {
        record_id:             4,
        cycle_id:              1,
        fields:                saved.fields.clone(),
        completion_percentage: 50.0,
        updated_at:            Utc::now(),
      },
      rows:              saved
        .rows
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, row)| StoredRow { row_id: 10 + i as i64, position: i as i64, row })
        .collect(),
      checklist_item_id: Some(3),
    };
    let echoed = SectionPayload::from_view(&view).apply_json(view.to_wire().unwrap()).unwrap();
    assert_eq!(echoed, saved);
  }

  #[test]
  fn background_validation_collects_all_errors() {
    let body = json!({
      "phone_number": "555-CALL-NOW",
      "email_address": "nobody",
      "year_implemented": 20,
      "last_general_review_date": "2026-01-05",
    });
    let mut payload = SectionPayload::from_json(Section::Background, body).unwrap();
    let errors = payload.validate(today());
    assert_eq!(errors.len(), 4);
    assert!(errors.contains("phone_number"));
    assert!(errors.contains("email_address"));
    assert!(errors.contains("year_implemented"));
    assert!(errors.contains("last_general_review_date"));
  }

  #[test]
  fn background_validation_normalises_values() {
    let body = json!({
      "phone_number": "(555) 123-4567",
      "year_implemented": 1998,
      "last_general_review_date": "06/30/2020",
    });
    let mut payload = SectionPayload::from_json(Section::Background, body).unwrap();
    assert!(payload.validate(today()).is_empty());
    let SectionFields::Background(info) = &payload.fields else { panic!() };
    assert_eq!(info.phone_number, "5551234567");
    assert_eq!(info.year_implemented.as_deref(), Some("1998"));
    assert_eq!(info.last_general_review_date.as_deref(), Some("2020-06-30"));
  }

  #[test]
  fn row_errors_use_per_collection_indices() {
    let body = json!({
      "classrooms": [ { "classroom_room": "B-101" } ],
      "upgrading_facilities": [
        { "facility_name": "HVAC", "last_upgrade_date": "2024-05-01" },
        { "facility_name": "Fiber", "last_upgrade_date": "2099-01-01" }
      ]
    });
    let mut payload = SectionPayload::from_json(Section::Criterion7, body).unwrap();
    let errors = payload.validate(today());
    assert_eq!(errors.len(), 1);
    assert!(errors.contains("upgrading_facilities[1].last_upgrade_date"));
  }

  #[test]
  fn fields_round_trip_through_parts() {
    let fields = SectionFields::Criterion3(Criterion3Outcomes {
      outcomes_publication_location:   "Catalog p. 12".into(),
      so_peo_relationship_explanation: String::new(),
    });
    let json = fields.to_json().unwrap();
    assert_eq!(SectionFields::from_parts(Section::Criterion3, json).unwrap(), fields);
  }

  #[test]
  fn section_tags_match_url_segments() {
    assert_eq!(Section::AppendixC.as_ref(), "appendixc");
    assert_eq!("criterion7".parse::<Section>().unwrap(), Section::Criterion7);
    assert_eq!(RowCollection::Table51Rows.as_ref(), "table_5_1_rows");
    assert_eq!(Section::AppendixD.slot(), CriterionSlot::Appendices);
    assert!(!Section::AppendixD.adopts_default_item());
  }
}
