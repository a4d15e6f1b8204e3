//! Evidence file metadata. Only the descriptive record is kept; file bytes
//! live elsewhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validate::{self, DateRule, FieldErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFile {
  pub evidence_id: i64,
  pub cycle_id:    i64,
  /// The account that registered the file.
  pub user_id:     i64,
  pub file_name:   String,
  pub file_type:   String,
  pub upload_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvidenceInput {
  pub file_name:   String,
  pub file_type:   String,
  /// Defaults to today when absent.
  pub upload_date: Option<String>,
}

/// Validated evidence fields, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvidence {
  pub file_name:   String,
  pub file_type:   String,
  pub upload_date: NaiveDate,
}

impl EvidenceInput {
  pub fn validate(self, today: NaiveDate) -> Result<NewEvidence, FieldErrors> {
    let mut errors = FieldErrors::new();
    let file_name = self.file_name.trim().to_string();
    let file_type = self.file_type.trim().to_string();
    validate::required(&mut errors, "file_name", &file_name);
    validate::required(&mut errors, "file_type", &file_type);

    let upload_date = match self.upload_date.as_deref() {
      Some(raw) if !validate::is_blank(raw) => {
        validate::date(&mut errors, "upload_date", raw, today, DateRule::NotFuture)
      }
      _ => Some(today),
    };

    errors.into_result()?;
    Ok(NewEvidence {
      file_name,
      file_type,
      upload_date: upload_date.unwrap_or(today),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 14).unwrap() }

  #[test]
  fn upload_date_defaults_to_today() {
    let input = EvidenceInput {
      file_name: "lab-inventory.xlsx".into(),
      file_type: "spreadsheet".into(),
      upload_date: None,
    };
    assert_eq!(input.validate(today()).unwrap().upload_date, today());
  }

  #[test]
  fn future_upload_dates_are_rejected() {
    let input = EvidenceInput {
      file_name: "minutes.pdf".into(),
      file_type: "pdf".into(),
      upload_date: Some("2026/10/15".into()),
    };
    let errors = input.validate(today()).unwrap_err();
    assert!(errors.contains("upload_date"));
  }

  #[test]
  fn name_and_type_are_required() {
    let errors = EvidenceInput::default().validate(today()).unwrap_err();
    assert!(errors.contains("file_name"));
    assert!(errors.contains("file_type"));
  }
}
