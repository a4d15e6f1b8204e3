//! Checklist items and the cycle progress roll-up.

use abet_core::{
  checklist::{
    self, ChecklistEntry, ChecklistItem, ChecklistItemUpdate, ChecklistView,
    NewChecklistItem, status_for,
  },
  slot::CriterionSlot,
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  encode::{ITEM_COLUMNS, RawChecklistItem},
  programs::cycle_exists,
};

pub fn cycle_items(conn: &Connection, cycle_id: i64) -> Result<Vec<ChecklistItem>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE cycle_id = ?1 ORDER BY item_id"
  ))?;
  let raws = stmt
    .query_map(params![cycle_id], RawChecklistItem::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawChecklistItem::into_item).collect()
}

pub fn list_items(conn: &Connection, cycle_id: Option<i64>) -> Result<Vec<ChecklistItem>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ITEM_COLUMNS} FROM checklist_items
      WHERE ?1 IS NULL OR cycle_id = ?1
      ORDER BY cycle_id, item_id"
  ))?;
  let raws = stmt
    .query_map(params![cycle_id], RawChecklistItem::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawChecklistItem::into_item).collect()
}

pub fn get_item(conn: &Connection, item_id: i64) -> Result<Option<ChecklistItem>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ITEM_COLUMNS} FROM checklist_items WHERE item_id = ?1"),
      params![item_id],
      RawChecklistItem::from_row,
    )
    .optional()?;
  raw.map(RawChecklistItem::into_item).transpose()
}

pub(crate) fn insert_item(
  conn: &Connection,
  cycle_id: i64,
  slot: CriterionSlot,
  item_name: &str,
  completion: f64,
  record_id: Option<i64>,
) -> Result<i64> {
  conn.execute(
    "INSERT INTO checklist_items
       (cycle_id, slot, item_name, status, completion_percentage, record_id)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      cycle_id,
      slot.as_ref(),
      item_name,
      status_for(completion),
      completion,
      record_id,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Insert the default item of every recognised slot that has none.
pub(crate) fn ensure_items_in(conn: &Connection, cycle_id: i64) -> Result<usize> {
  let items = cycle_items(conn, cycle_id)?;
  let missing = checklist::missing_slots(&items);
  for slot in &missing {
    insert_item(conn, cycle_id, *slot, slot.default_item_name(), 0.0, None)?;
  }
  if !missing.is_empty() {
    tracing::debug!(cycle_id, created = missing.len(), "created default checklist items");
  }
  Ok(missing.len())
}

/// Recompute the cycle's overall progress from its items and store it.
pub(crate) fn refresh_progress_in(conn: &Connection, cycle_id: i64) -> Result<f64> {
  let items = cycle_items(conn, cycle_id)?;
  let progress = checklist::compute_cycle_progress(&items);
  conn.execute(
    "UPDATE cycles SET overall_progress_percentage = ?2 WHERE cycle_id = ?1",
    params![cycle_id, progress],
  )?;
  Ok(progress)
}

pub fn ensure_items(conn: &mut Connection, cycle_id: i64) -> Result<usize> {
  let tx = conn.transaction()?;
  let created = ensure_items_in(&tx, cycle_id)?;
  tx.commit()?;
  Ok(created)
}

pub fn cycle_checklist(conn: &mut Connection, cycle_id: i64) -> Result<Option<ChecklistView>> {
  let tx = conn.transaction()?;
  if !cycle_exists(&tx, cycle_id)? {
    return Ok(None);
  }
  ensure_items_in(&tx, cycle_id)?;
  let overall_progress = refresh_progress_in(&tx, cycle_id)?;
  let mut items = cycle_items(&tx, cycle_id)?;
  tx.commit()?;

  items.sort_by_key(|i| (i.slot.number().unwrap_or(u8::MAX), i.item_id));
  Ok(Some(ChecklistView {
    cycle_id,
    overall_progress,
    items: items.into_iter().map(ChecklistEntry::from).collect(),
  }))
}

pub fn create_item(conn: &mut Connection, input: NewChecklistItem) -> Result<Option<ChecklistItem>> {
  let tx = conn.transaction()?;
  if !cycle_exists(&tx, input.cycle_id)? {
    return Ok(None);
  }
  let slot = input.resolved_slot();
  let completion = input.completion_percentage.clamp(0.0, 100.0);
  let item_id = insert_item(&tx, input.cycle_id, slot, input.item_name.trim(), completion, None)?;
  refresh_progress_in(&tx, input.cycle_id)?;
  let item = get_item(&tx, item_id)?;
  tx.commit()?;
  Ok(item)
}

pub fn update_item(
  conn: &mut Connection,
  item_id: i64,
  update: ChecklistItemUpdate,
) -> Result<Option<ChecklistItem>> {
  let tx = conn.transaction()?;
  let Some(mut item) = get_item(&tx, item_id)? else {
    return Ok(None);
  };
  if let Some(slot) = update.slot {
    item.slot = slot;
  }
  if let Some(name) = update.item_name {
    item.item_name = name.trim().to_string();
  }
  if let Some(pct) = update.completion_percentage {
    item.completion_percentage = pct.clamp(0.0, 100.0);
  }
  item.status = status_for(item.completion_percentage);

  tx.execute(
    "UPDATE checklist_items
        SET slot = ?2, item_name = ?3, status = ?4, completion_percentage = ?5
      WHERE item_id = ?1",
    params![
      item_id,
      item.slot.as_ref(),
      item.item_name,
      item.status,
      item.completion_percentage,
    ],
  )?;
  refresh_progress_in(&tx, item.cycle_id)?;
  tx.commit()?;
  Ok(Some(item))
}

pub fn delete_item(conn: &mut Connection, item_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  let Some(item) = get_item(&tx, item_id)? else {
    return Ok(false);
  };
  tx.execute("DELETE FROM checklist_items WHERE item_id = ?1", params![item_id])?;
  refresh_progress_in(&tx, item.cycle_id)?;
  tx.commit()?;
  Ok(true)
}
