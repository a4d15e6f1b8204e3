//! Checklist slots: the canonical criterion/appendix categories a checklist
//! item is tracked under.
//!
//! Every checklist item stores its slot as an explicit tag. Name-based
//! detection survives only in [`CriterionSlot::from_legacy_name`] for clients
//! that still submit items without one.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// One of the ten recognised checklist slots, or the sentinel
/// [`CriterionSlot::Unrecognized`] which never feeds cycle progress.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CriterionSlot {
  Background,
  Criterion1,
  Criterion2,
  Criterion3,
  Criterion4,
  Criterion5,
  Criterion6,
  Criterion7,
  Criterion8,
  Appendices,
  Unrecognized,
}

impl CriterionSlot {
  /// The recognised slots in criterion-number order (0–9).
  pub const RECOGNIZED: [CriterionSlot; 10] = [
    Self::Background,
    Self::Criterion1,
    Self::Criterion2,
    Self::Criterion3,
    Self::Criterion4,
    Self::Criterion5,
    Self::Criterion6,
    Self::Criterion7,
    Self::Criterion8,
    Self::Appendices,
  ];

  /// Criterion number: 0 for background, 1–8 for criteria, 9 for appendices.
  pub fn number(self) -> Option<u8> {
    Self::RECOGNIZED
      .iter()
      .position(|s| *s == self)
      .map(|i| i as u8)
  }

  pub fn from_number(n: u8) -> Option<Self> {
    Self::RECOGNIZED.get(usize::from(n)).copied()
  }

  pub fn is_recognized(self) -> bool { self != Self::Unrecognized }

  /// Name given to the item created by `ensure_checklist_items`.
  pub fn default_item_name(self) -> &'static str {
    match self {
      Self::Background => "Background Information",
      Self::Criterion1 => "Criterion 1 - Students",
      Self::Criterion2 => "Criterion 2 - Program Educational Objectives",
      Self::Criterion3 => "Criterion 3 - Student Outcomes",
      Self::Criterion4 => "Criterion 4 - Continuous Improvement",
      Self::Criterion5 => "Criterion 5 - Curriculum",
      Self::Criterion6 => "Criterion 6 - Faculty",
      Self::Criterion7 => "Criterion 7 - Facilities",
      Self::Criterion8 => "Criterion 8 - Institutional Support",
      Self::Appendices => "Appendices",
      Self::Unrecognized => "Unrecognized Item",
    }
  }

  /// Legacy detection by case-insensitive substring over a display name.
  ///
  /// Only used to tag items submitted without an explicit slot.
  pub fn from_legacy_name(name: &str) -> Self {
    let lowered = name.to_lowercase();
    if lowered.contains("background") {
      return Self::Background;
    }
    if lowered.contains("append") {
      return Self::Appendices;
    }
    for n in 1..=8u8 {
      if lowered.contains(&format!("criterion {n}")) {
        // `from_number` cannot fail for 1..=8.
        return Self::from_number(n).unwrap_or(Self::Unrecognized);
      }
    }
    Self::Unrecognized
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_cover_zero_through_nine() {
    assert_eq!(CriterionSlot::Background.number(), Some(0));
    assert_eq!(CriterionSlot::Criterion5.number(), Some(5));
    assert_eq!(CriterionSlot::Appendices.number(), Some(9));
    assert_eq!(CriterionSlot::Unrecognized.number(), None);
    assert_eq!(CriterionSlot::from_number(8), Some(CriterionSlot::Criterion8));
    assert_eq!(CriterionSlot::from_number(10), None);
  }

  #[test]
  fn legacy_names_map_to_slots() {
    assert_eq!(
      CriterionSlot::from_legacy_name("Background Information"),
      CriterionSlot::Background
    );
    assert_eq!(
      CriterionSlot::from_legacy_name("Appendix C - Equipment"),
      CriterionSlot::Appendices
    );
    assert_eq!(
      CriterionSlot::from_legacy_name("CRITERION 8 - Institutional Support"),
      CriterionSlot::Criterion8
    );
    assert_eq!(
      CriterionSlot::from_legacy_name("Self-study cover letter"),
      CriterionSlot::Unrecognized
    );
  }

  #[test]
  fn tags_round_trip_through_strum() {
    for slot in CriterionSlot::RECOGNIZED {
      let parsed: CriterionSlot = slot.as_ref().parse().unwrap();
      assert_eq!(parsed, slot);
    }
    assert_eq!(CriterionSlot::Criterion3.as_ref(), "criterion3");
  }
}
