//! Faculty members, their program assignments and dependent profile rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumString};

use crate::{
  program::Program,
  validate::{self, FieldErrors, row_field},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyMember {
  pub faculty_id:       i64,
  pub full_name:        String,
  pub academic_rank:    String,
  pub appointment_type: String,
  pub email:            String,
  pub phone:            String,
  pub office_hours:     String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FacultyInput {
  pub full_name:        String,
  pub academic_rank:    String,
  pub appointment_type: String,
  pub email:            String,
  pub phone:            String,
  pub office_hours:     String,
}

impl FacultyInput {
  /// Trim, lowercase the email and normalise the phone number. Email
  /// uniqueness is checked against the store by the caller.
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for value in [
      &mut self.full_name,
      &mut self.academic_rank,
      &mut self.appointment_type,
      &mut self.office_hours,
    ] {
      *value = value.trim().to_string();
    }
    self.email = self.email.trim().to_lowercase();

    validate::required(&mut errors, "full_name", &self.full_name);
    if validate::is_blank(&self.email) {
      errors.add("email", validate::MSG_REQUIRED);
    } else {
      validate::email(&mut errors, "email", &self.email);
    }
    validate::normalize_phone(&mut errors, "phone", &mut self.phone);
    errors
  }
}

/// The `{faculty_id, full_name}` pairs offered by selection forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacultyOption {
  pub faculty_id: i64,
  pub full_name:  String,
}

impl From<&FacultyMember> for FacultyOption {
  fn from(m: &FacultyMember) -> Self {
    Self { faculty_id: m.faculty_id, full_name: m.full_name.clone() }
  }
}

// ─── Dependent rows ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacultyCollection {
  Qualifications,
  Certifications,
  Memberships,
  Workload,
  Publications,
  ProfessionalDevelopment,
  Consulting,
}

/// One free-form profile row (degree, certificate, paper, ...).
pub type FacultyRow = Map<String, Value>;

/// All dependent rows of one member, grouped by collection. Replacing the
/// records replaces every collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacultyRecords {
  pub qualifications:           Vec<FacultyRow>,
  pub certifications:           Vec<FacultyRow>,
  pub memberships:              Vec<FacultyRow>,
  pub workload:                 Vec<FacultyRow>,
  pub publications:             Vec<FacultyRow>,
  pub professional_development: Vec<FacultyRow>,
  pub consulting:               Vec<FacultyRow>,
}

impl FacultyRecords {
  pub fn rows(&self, collection: FacultyCollection) -> &[FacultyRow] {
    match collection {
      FacultyCollection::Qualifications => &self.qualifications,
      FacultyCollection::Certifications => &self.certifications,
      FacultyCollection::Memberships => &self.memberships,
      FacultyCollection::Workload => &self.workload,
      FacultyCollection::Publications => &self.publications,
      FacultyCollection::ProfessionalDevelopment => &self.professional_development,
      FacultyCollection::Consulting => &self.consulting,
    }
  }

  pub fn rows_mut(&mut self, collection: FacultyCollection) -> &mut Vec<FacultyRow> {
    match collection {
      FacultyCollection::Qualifications => &mut self.qualifications,
      FacultyCollection::Certifications => &mut self.certifications,
      FacultyCollection::Memberships => &mut self.memberships,
      FacultyCollection::Workload => &mut self.workload,
      FacultyCollection::Publications => &mut self.publications,
      FacultyCollection::ProfessionalDevelopment => &mut self.professional_development,
      FacultyCollection::Consulting => &mut self.consulting,
    }
  }

  pub const COLLECTIONS: [FacultyCollection; 7] = [
    FacultyCollection::Qualifications,
    FacultyCollection::Certifications,
    FacultyCollection::Memberships,
    FacultyCollection::Workload,
    FacultyCollection::Publications,
    FacultyCollection::ProfessionalDevelopment,
    FacultyCollection::Consulting,
  ];

  /// Drop null values and rows holding nothing but blanks, then check any
  /// `year` value is four digits.
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for collection in Self::COLLECTIONS {
      let rows = self.rows_mut(collection);
      for row in rows.iter_mut() {
        row.retain(|_, v| !v.is_null());
      }
      rows.retain(|row| {
        row.values().any(|v| match v {
          Value::String(s) => !s.trim().is_empty(),
          _ => true,
        })
      });
      for (i, row) in rows.iter().enumerate() {
        if let Some(Value::String(year)) = row.get("year") {
          validate::year_format(&mut errors, &row_field(collection.as_ref(), i, "year"), year);
        }
      }
    }
    errors
  }
}

/// A course section taught by a member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaughtSection {
  pub section_id:  i64,
  pub course_id:   i64,
  pub course_code: String,
  pub term:        String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacultyProfile {
  pub member:   FacultyMember,
  pub programs: Vec<Program>,
  pub records:  FacultyRecords,
  pub sections: Vec<TaughtSection>,
}

/// Body of `PUT /faculty/{id}/profile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FacultyProfileUpdate {
  pub member:  Option<FacultyInput>,
  pub records: FacultyRecords,
}

/// Body of `PUT /faculty/{id}/programs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramAssignments {
  pub program_ids: Vec<i64>,
}
