//! Student outcomes (SO), program educational objectives (PEO), course
//! learning outcomes (CLO) and the mappings between them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::validate::{self, FieldErrors, row_field};

/// Which outcome table a row lives in. SOs and PEOs are owned by a program,
/// CLOs by a course.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutcomeKind {
  So,
  Peo,
  Clo,
}

impl OutcomeKind {
  pub fn label(self) -> &'static str {
    match self {
      Self::So => "Student outcome",
      Self::Peo => "Program educational objective",
      Self::Clo => "Course learning outcome",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
  pub outcome_id:  i64,
  pub kind:        OutcomeKind,
  /// Program id for SOs and PEOs, course id for CLOs.
  pub owner_id:    i64,
  /// Short label, e.g. `"SO 1"`.
  pub code:        String,
  pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutcomeInput {
  pub code:        String,
  pub description: String,
}

impl OutcomeInput {
  pub fn validate(&mut self) -> FieldErrors {
    let mut errors = FieldErrors::new();
    self.code = self.code.trim().to_string();
    self.description = self.description.trim().to_string();
    validate::required(&mut errors, "code", &self.code);
    validate::required(&mut errors, "description", &self.description);
    errors
  }
}

// ─── Mappings ────────────────────────────────────────────────────────────────

/// An SO supports a PEO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoPeoMapping {
  pub so_id:  i64,
  pub peo_id: i64,
}

/// A CLO maps to an SO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CloSoMapping {
  pub clo_id: i64,
  pub so_id:  i64,
}

/// Body and response of the mapping endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSet<T> {
  pub mappings: Vec<T>,
}

/// Keep the first occurrence of each pair, preserving order.
pub fn dedupe_pairs<T: Copy + Eq + std::hash::Hash>(pairs: Vec<T>) -> Vec<T> {
  let mut seen = HashSet::new();
  pairs.into_iter().filter(|p| seen.insert(*p)).collect()
}

/// Check every mapping entry against the ids its two sides may reference.
/// Errors are keyed `mappings[i].<field>`.
pub fn check_pairs<T>(
  pairs: &[T],
  split: impl Fn(&T) -> (i64, i64),
  (left_field, left_ids): (&str, &HashSet<i64>),
  (right_field, right_ids): (&str, &HashSet<i64>),
) -> FieldErrors {
  let mut errors = FieldErrors::new();
  for (i, pair) in pairs.iter().enumerate() {
    let (left, right) = split(pair);
    if !left_ids.contains(&left) {
      errors.add(row_field("mappings", i, left_field), format!("Unknown {left_field} {left}."));
    }
    if !right_ids.contains(&right) {
      errors.add(row_field("mappings", i, right_field), format!("Unknown {right_field} {right}."));
    }
  }
  errors
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_pairs_collapse() {
    let pairs = vec![
      SoPeoMapping { so_id: 1, peo_id: 2 },
      SoPeoMapping { so_id: 1, peo_id: 3 },
      SoPeoMapping { so_id: 1, peo_id: 2 },
    ];
    assert_eq!(dedupe_pairs(pairs).len(), 2);
  }

  #[test]
  fn foreign_ids_are_reported_per_entry() {
    let sos: HashSet<i64> = [1, 2].into();
    let peos: HashSet<i64> = [10].into();
    let pairs = vec![
      SoPeoMapping { so_id: 1, peo_id: 10 },
      SoPeoMapping { so_id: 9, peo_id: 10 },
      SoPeoMapping { so_id: 2, peo_id: 11 },
    ];
    let errors = check_pairs(
      &pairs,
      |m| (m.so_id, m.peo_id),
      ("so_id", &sos),
      ("peo_id", &peos),
    );
    assert_eq!(errors.len(), 2);
    assert!(errors.contains("mappings[1].so_id"));
    assert!(errors.contains("mappings[2].peo_id"));
  }

  #[test]
  fn kinds_have_url_tags() {
    assert_eq!(OutcomeKind::Clo.as_ref(), "clo");
    assert_eq!("peo".parse::<OutcomeKind>().unwrap(), OutcomeKind::Peo);
  }
}
