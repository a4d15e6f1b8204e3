//! Programs and their accreditation cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{self, FieldErrors};

/// An academic degree program under accreditation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub program_id:    i64,
  pub program_name:  String,
  /// e.g. `"Undergraduate"`, `"Graduate"`.
  pub program_level: String,
}

/// Create/replace body for a program.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgramInput {
  pub program_name:  String,
  pub program_level: String,
}

impl ProgramInput {
  /// Trims both fields; uniqueness is checked by the caller.
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    self.program_name = self.program_name.trim().to_string();
    self.program_level = self.program_level.trim().to_string();
    validate::required(&mut errors, "program_name", &self.program_name);
    validate::required(&mut errors, "program_level", &self.program_level);
    errors
  }
}

/// One accreditation review period of a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
  pub cycle_id:                    i64,
  pub program_id:                  i64,
  pub start_year:                  i32,
  pub end_year:                    i32,
  /// Derived by the checklist roll-up; never written by clients.
  pub overall_progress_percentage: f64,
  pub created_at:                  DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CycleInput {
  pub start_year: Option<serde_json::Value>,
  pub end_year:   Option<serde_json::Value>,
}

impl CycleInput {
  /// Returns `(start, end)` when both are four-digit years with
  /// `start <= end`.
  pub fn validate(&self) -> Result<(i32, i32), FieldErrors> {
    let mut errors = FieldErrors::new();
    let start = year_value(&mut errors, "start_year", self.start_year.as_ref());
    let end = year_value(&mut errors, "end_year", self.end_year.as_ref());
    if let (Some(start), Some(end)) = (start, end) {
      if end < start {
        errors.add("end_year", "End year cannot be before start year.");
      }
    }
    errors.into_result()?;
    match (start, end) {
      (Some(start), Some(end)) => Ok((start, end)),
      _ => Err(FieldErrors::single(validate::NON_FIELD, validate::MSG_REQUIRED)),
    }
  }
}

fn year_value(
  errors: &mut FieldErrors,
  field: &str,
  value: Option<&serde_json::Value>,
) -> Option<i32> {
  let raw = match value {
    None | Some(serde_json::Value::Null) => {
      errors.add(field, validate::MSG_REQUIRED);
      return None;
    }
    Some(serde_json::Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
  };
  validate::year_format(errors, field, &raw)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn cycle(body: serde_json::Value) -> CycleInput {
    serde_json::from_value(body).unwrap()
  }

  #[test]
  fn cycle_years_accept_strings_and_numbers() {
    let input = cycle(json!({ "start_year": "2025", "end_year": 2031 }));
    assert_eq!(input.validate().unwrap(), (2025, 2031));
  }

  #[test]
  fn cycle_years_must_be_ordered() {
    let errors = cycle(json!({ "start_year": 2030, "end_year": 2024 }))
      .validate()
      .unwrap_err();
    assert!(errors.contains("end_year"));
  }

  #[test]
  fn cycle_years_are_required_and_four_digits() {
    let errors = cycle(json!({ "end_year": 24 })).validate().unwrap_err();
    assert!(errors.contains("start_year"));
    assert!(errors.contains("end_year"));
  }

  #[test]
  fn program_fields_are_trimmed_and_required() {
    let mut input = ProgramInput { program_name: "  CCE ".into(), program_level: " ".into() };
    let errors = input.validate();
    assert_eq!(input.program_name, "CCE");
    assert!(errors.contains("program_level"));
    assert!(!errors.contains("program_name"));
  }
}
