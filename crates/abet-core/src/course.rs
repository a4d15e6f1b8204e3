//! Courses, instructor syllabus sections and syllabus content.
//!
//! A course belongs to one cycle. Each instructor teaching it owns one
//! syllabus section; sections of the same course share a unified syllabus and
//! its description, outline and additional-info rows, while textbooks,
//! assessments and the other lists are owned by the section alone.

use serde::{Deserialize, Serialize};

use crate::{
  faculty::FacultyOption,
  outcome::Outcome,
  validate::{self, FieldErrors, row_field},
};

/// Trim, collapse inner whitespace and uppercase: `" eece  210 "` → `"EECE 210"`.
pub fn normalize_course_code(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
  pub course_id:           i64,
  pub cycle_id:            i64,
  pub program_id:          i64,
  pub course_code:         String,
  pub course_title:        String,
  pub credits:             f64,
  pub contact_hours:       f64,
  /// `"Required"`, `"Elective"` or `"Selected Elective"`.
  pub course_type:         String,
  pub unified_syllabus_id: Option<i64>,
}

/// Create/replace body for a course. `cycle_id` may also come from the query
/// string on create.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourseInput {
  pub cycle_id:      Option<i64>,
  pub course_code:   String,
  pub course_title:  String,
  pub credits:       Option<f64>,
  pub contact_hours: Option<f64>,
  pub course_type:   String,
}

impl CourseInput {
  /// Normalise the course code and check local constraints. Uniqueness within
  /// the cycle is checked against the store by the caller.
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_course_fields(
      &mut errors,
      "",
      &mut self.course_code,
      self.credits,
      self.contact_hours,
      &mut self.course_type,
    );
    self.course_title = self.course_title.trim().to_string();
    errors
  }
}

fn check_course_fields(
  errors: &mut FieldErrors,
  prefix: &str,
  code: &mut String,
  credits: Option<f64>,
  contact_hours: Option<f64>,
  course_type: &mut String,
) {
  *code = normalize_course_code(code);
  validate::required(errors, &format!("{prefix}course_code"), code);
  if let Some(c) = credits {
    validate::non_negative(errors, &format!("{prefix}credits"), c);
  }
  if let Some(h) = contact_hours {
    validate::non_negative(errors, &format!("{prefix}contact_hours"), h);
  }
  if validate::is_blank(course_type) {
    *course_type = "Required".to_string();
  } else {
    *course_type = course_type.trim().to_string();
  }
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// One instructor's section of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorSyllabus {
  pub section_id:          i64,
  pub course_id:           i64,
  pub faculty_id:          i64,
  pub term:                String,
  pub unified_syllabus_id: i64,
  pub description_id:      i64,
  pub outline_id:          i64,
  pub additional_info_id:  i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewSection {
  pub faculty_id: Option<i64>,
  pub term:       String,
}

impl NewSection {
  pub fn validate(&mut self) -> Result<i64, FieldErrors> {
    let mut errors = FieldErrors::new();
    self.term = self.term.trim().to_string();
    validate::required(&mut errors, "term", &self.term);
    let faculty_id = match self.faculty_id {
      Some(id) if id > 0 => Some(id),
      _ => {
        errors.add("faculty_id", validate::MSG_REQUIRED);
        None
      }
    };
    errors.into_result()?;
    faculty_id.ok_or_else(|| FieldErrors::single("faculty_id", validate::MSG_REQUIRED))
  }
}

// ─── Syllabus content ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Textbook {
  pub title_author_year: String,
  /// `"Required"`, `"Recommended"`, ...
  pub attribute:         String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Supplement {
  #[serde(alias = "material_discription")]
  pub material_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRef {
  pub course_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assessment {
  pub assessment_type:   String,
  pub weight_percentage: f64,
}

/// A CLO assigned to the section, optionally mapped to a student outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloAssignment {
  pub clo_id: i64,
  #[serde(default)]
  pub so_id:  Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyllabusContent {
  pub catalog_description:         String,
  pub weekly_topics:               String,
  pub design_content_percentage:   f64,
  pub software_or_labs_tools_used: String,
  pub textbooks:                   Vec<Textbook>,
  pub supplements:                 Vec<Supplement>,
  pub prerequisites:               Vec<CourseRef>,
  pub corequisites:                Vec<CourseRef>,
  pub assessments:                 Vec<Assessment>,
  pub clo_mappings:                Vec<CloAssignment>,
}

impl SyllabusContent {
  /// Percentages, weights and list entries. CLO/SO ownership is checked
  /// against the store by the caller.
  pub fn validate(&mut self, errors: &mut FieldErrors, prefix: &str) {
    let field = |name: &str| format!("{prefix}{name}");

    validate::percentage(errors, &field("design_content_percentage"), self.design_content_percentage);

    let assessments = field("assessments");
    let mut total = 0.0;
    for (i, a) in self.assessments.iter_mut().enumerate() {
      a.assessment_type = a.assessment_type.trim().to_string();
      validate::required(errors, &row_field(&assessments, i, "assessment_type"), &a.assessment_type);
      validate::percentage(errors, &row_field(&assessments, i, "weight_percentage"), a.weight_percentage);
      total += a.weight_percentage;
    }
    if total > 100.0 {
      errors.add(assessments, "Assessment weights cannot total more than 100.");
    }

    let textbooks = field("textbooks");
    for (i, t) in self.textbooks.iter_mut().enumerate() {
      t.title_author_year = t.title_author_year.trim().to_string();
      t.attribute = t.attribute.trim().to_string();
      validate::required(errors, &row_field(&textbooks, i, "title_author_year"), &t.title_author_year);
    }

    self.supplements.retain(|s| !validate::is_blank(&s.material_description));
    for list in [&mut self.prerequisites, &mut self.corequisites] {
      for r in list.iter_mut() {
        r.course_code = normalize_course_code(&r.course_code);
      }
      list.retain(|r| !r.course_code.is_empty());
      let mut seen = std::collections::HashSet::new();
      list.retain(|r| seen.insert(r.course_code.clone()));
    }

    let mappings = field("clo_mappings");
    for (i, m) in self.clo_mappings.iter().enumerate() {
      if m.clo_id <= 0 {
        errors.add(row_field(&mappings, i, "clo_id"), validate::MSG_REQUIRED);
      }
    }
    let mut seen = std::collections::HashSet::new();
    self.clo_mappings.retain(|m| seen.insert(*m));
  }
}

/// Course fields editable through the syllabus form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyllabusCourse {
  pub course_code:   String,
  pub course_title:  Option<String>,
  pub credits:       Option<f64>,
  pub contact_hours: Option<f64>,
  pub course_type:   String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyllabusSection {
  pub term:       String,
  pub faculty_id: Option<i64>,
}

/// Body of `PUT .../sections/{sid}/syllabus`: course, section and syllabus
/// written together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyllabusUpdate {
  pub course:   SyllabusCourse,
  pub section:  SyllabusSection,
  pub syllabus: SyllabusContent,
}

impl SyllabusUpdate {
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let course = &mut self.course;
    check_course_fields(
      &mut errors,
      "course.",
      &mut course.course_code,
      course.credits,
      course.contact_hours,
      &mut course.course_type,
    );
    if let Some(title) = course.course_title.as_mut() {
      *title = title.trim().to_string();
    }

    self.section.term = self.section.term.trim().to_string();
    validate::required(&mut errors, "section.term", &self.section.term);
    if !self.section.faculty_id.is_some_and(|id| id > 0) {
      errors.add("section.faculty_id", validate::MSG_REQUIRED);
    }

    self.syllabus.validate(&mut errors, "syllabus.");
    errors
  }
}

/// A section together with its content, as read from the store.
#[derive(Debug, Clone, Serialize)]
pub struct SyllabusRecord {
  pub section: InstructorSyllabus,
  pub content: SyllabusContent,
}

/// `GET .../sections/{sid}/syllabus`: the nested record plus the choices the
/// editing form offers.
#[derive(Debug, Clone, Serialize)]
pub struct SyllabusDetail {
  pub course:          Course,
  pub section:         InstructorSyllabus,
  pub syllabus:        SyllabusContent,
  pub available_sos:   Vec<Outcome>,
  pub available_clos:  Vec<Outcome>,
  pub faculty_options: Vec<FacultyOption>,
}
