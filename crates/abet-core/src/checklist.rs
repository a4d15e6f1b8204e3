//! Checklist items and the cycle progress roll-up.
//!
//! Each cycle owns exactly one checklist: the set of its checklist items.
//! Progress is derived, never entered: per recognised slot take the highest
//! completion among the items tagged with it, then average the ten slots.

use serde::{Deserialize, Serialize};

use crate::slot::CriterionSlot;

/// `status` value of an item below 100 %.
pub const STATUS_INCOMPLETE: i32 = 0;
/// `status` value of an item at (or above) 100 %.
pub const STATUS_COMPLETE: i32 = 1;

/// Status implied by a completion percentage.
pub fn status_for(percentage: f64) -> i32 {
  if percentage >= 100.0 { STATUS_COMPLETE } else { STATUS_INCOMPLETE }
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// A tracked unit of completion progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
  pub item_id:               i64,
  pub cycle_id:              i64,
  pub slot:                  CriterionSlot,
  pub item_name:             String,
  pub status:                i32,
  pub completion_percentage: f64,
  /// The section record this item reports on, once one has been saved.
  pub record_id:             Option<i64>,
}

/// Input to [`crate::store::AccreditationStore::create_checklist_item`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewChecklistItem {
  pub cycle_id:              i64,
  /// When absent the slot is inferred from `item_name`.
  pub slot:                  Option<CriterionSlot>,
  pub item_name:             String,
  #[serde(default)]
  pub completion_percentage: f64,
}

impl NewChecklistItem {
  pub fn resolved_slot(&self) -> CriterionSlot {
    self
      .slot
      .unwrap_or_else(|| CriterionSlot::from_legacy_name(&self.item_name))
  }
}

/// Partial update; `status` always follows `completion_percentage`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistItemUpdate {
  pub slot:                  Option<CriterionSlot>,
  pub item_name:             Option<String>,
  pub completion_percentage: Option<f64>,
}

// ─── Checklist view ──────────────────────────────────────────────────────────

/// A checklist item as rendered in the cycle checklist.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistEntry {
  #[serde(flatten)]
  pub item:             ChecklistItem,
  pub criterion_number: Option<u8>,
}

impl From<ChecklistItem> for ChecklistEntry {
  fn from(item: ChecklistItem) -> Self {
    let criterion_number = item.slot.number();
    Self { item, criterion_number }
  }
}

/// The aggregate returned by `GET /cycles/{id}/checklist`.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistView {
  pub cycle_id:         i64,
  pub overall_progress: f64,
  pub items:            Vec<ChecklistEntry>,
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// Slots among [`CriterionSlot::RECOGNIZED`] with no item yet.
pub fn missing_slots(items: &[ChecklistItem]) -> Vec<CriterionSlot> {
  CriterionSlot::RECOGNIZED
    .into_iter()
    .filter(|slot| !items.iter().any(|i| i.slot == *slot))
    .collect()
}

/// Highest completion per recognised slot, indexed by criterion number.
pub fn slot_percentages(items: &[ChecklistItem]) -> [f64; 10] {
  let mut slots = [0.0_f64; 10];
  for item in items {
    if let Some(n) = item.slot.number() {
      let pct = item.completion_percentage.clamp(0.0, 100.0);
      let entry = &mut slots[usize::from(n)];
      if pct > *entry {
        *entry = pct;
      }
    }
  }
  slots
}

/// Overall cycle progress: mean of the ten slot percentages, rounded.
pub fn compute_cycle_progress(items: &[ChecklistItem]) -> f64 {
  let slots = slot_percentages(items);
  (slots.iter().sum::<f64>() / slots.len() as f64).round()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(slot: CriterionSlot, pct: f64) -> ChecklistItem {
    ChecklistItem {
      item_id: 0,
      cycle_id: 1,
      slot,
      item_name: slot.default_item_name().to_string(),
      status: status_for(pct),
      completion_percentage: pct,
      record_id: None,
    }
  }

  #[test]
  fn empty_checklist_is_zero_and_missing_everything() {
    assert_eq!(compute_cycle_progress(&[]), 0.0);
    assert_eq!(missing_slots(&[]).len(), 10);
  }

  #[test]
  fn three_complete_slots_is_thirty() {
    let mut items: Vec<_> = CriterionSlot::RECOGNIZED
      .iter()
      .map(|s| item(*s, 0.0))
      .collect();
    items[1].completion_percentage = 100.0;
    items[4].completion_percentage = 100.0;
    items[9].completion_percentage = 100.0;
    assert_eq!(compute_cycle_progress(&items), 30.0);
  }

  #[test]
  fn half_complete_slot_counts_under_mean_policy() {
    // One slot at 50 %: the mean policy yields 5, not the 0 a
    // count-of-complete-slots policy would.
    let items = vec![item(CriterionSlot::Criterion2, 50.0)];
    assert_eq!(compute_cycle_progress(&items), 5.0);
  }

  #[test]
  fn highest_item_wins_within_a_slot() {
    let items = vec![
      item(CriterionSlot::Appendices, 20.0),
      item(CriterionSlot::Appendices, 80.0),
      item(CriterionSlot::Appendices, 40.0),
    ];
    assert_eq!(slot_percentages(&items)[9], 80.0);
    assert_eq!(compute_cycle_progress(&items), 8.0);
  }

  #[test]
  fn unrecognized_items_are_ignored() {
    let items = vec![item(CriterionSlot::Unrecognized, 100.0)];
    assert_eq!(compute_cycle_progress(&items), 0.0);
    assert_eq!(missing_slots(&items).len(), 10);
  }

  #[test]
  fn status_tracks_percentage() {
    assert_eq!(status_for(99.5), STATUS_INCOMPLETE);
    assert_eq!(status_for(100.0), STATUS_COMPLETE);
  }
}
