//! Section records, their rows, and the checklist sync performed on save.

use abet_core::{
  checklist::status_for,
  completion,
  section::{Section, SectionFields, SectionPayload, SectionRecord, SectionView, StoredRow},
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  checklist::{insert_item, refresh_progress_in},
  encode::{RECORD_COLUMNS, RawSectionRecord, RawSectionRow, encode_dt},
  programs::cycle_exists,
};

fn find_record(conn: &Connection, cycle_id: i64, section: Section) -> Result<Option<SectionRecord>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {RECORD_COLUMNS} FROM section_records WHERE cycle_id = ?1 AND section = ?2"
      ),
      params![cycle_id, section.as_ref()],
      RawSectionRecord::from_row,
    )
    .optional()?;
  raw.map(RawSectionRecord::into_record).transpose()
}

/// Fetch the record, creating an empty one if the cycle has none yet.
fn record_or_create(conn: &Connection, cycle_id: i64, section: Section) -> Result<SectionRecord> {
  if let Some(record) = find_record(conn, cycle_id, section)? {
    return Ok(record);
  }
  let fields = SectionFields::empty(section);
  let now = Utc::now();
  conn.execute(
    "INSERT INTO section_records
       (cycle_id, section, fields_json, completion_percentage, updated_at)
     VALUES (?1, ?2, ?3, 0, ?4)",
    params![cycle_id, section.as_ref(), fields.to_json()?.to_string(), encode_dt(now)],
  )?;
  tracing::debug!(cycle_id, section = section.as_ref(), "created empty section record");
  Ok(SectionRecord {
    record_id: conn.last_insert_rowid(),
    cycle_id,
    fields,
    completion_percentage: 0.0,
    updated_at: now,
  })
}

fn record_rows(conn: &Connection, record_id: i64) -> Result<Vec<StoredRow>> {
  let mut stmt = conn.prepare(
    "SELECT row_id, collection, position, data_json FROM section_rows
      WHERE record_id = ?1 ORDER BY collection, position",
  )?;
  let raws = stmt
    .query_map(params![record_id], RawSectionRow::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawSectionRow::into_stored).collect()
}

fn linked_item(conn: &Connection, record_id: i64) -> Result<Option<i64>> {
  Ok(
    conn
      .query_row(
        "SELECT item_id FROM checklist_items WHERE record_id = ?1 ORDER BY item_id LIMIT 1",
        params![record_id],
        |r| r.get(0),
      )
      .optional()?,
  )
}

fn view_of(conn: &Connection, record: SectionRecord) -> Result<SectionView> {
  let rows = record_rows(conn, record.record_id)?;
  let checklist_item_id = linked_item(conn, record.record_id)?;
  Ok(SectionView { record, rows, checklist_item_id })
}

pub fn section_view(conn: &mut Connection, cycle_id: i64, section: Section) -> Result<Option<SectionView>> {
  let tx = conn.transaction()?;
  if !cycle_exists(&tx, cycle_id)? {
    return Ok(None);
  }
  let record = record_or_create(&tx, cycle_id, section)?;
  let view = view_of(&tx, record)?;
  tx.commit()?;
  Ok(Some(view))
}

/// Find the checklist item reporting on `record_id`, adopting or creating one
/// on first save. Criteria claim their slot's unlinked default item;
/// appendices get an item of their own.
fn claim_item(conn: &Connection, cycle_id: i64, section: Section, record_id: i64) -> Result<i64> {
  if let Some(item_id) = linked_item(conn, record_id)? {
    return Ok(item_id);
  }

  if section.adopts_default_item() {
    let unclaimed: Option<i64> = conn
      .query_row(
        "SELECT item_id FROM checklist_items
          WHERE cycle_id = ?1 AND slot = ?2 AND record_id IS NULL
          ORDER BY item_id LIMIT 1",
        params![cycle_id, section.slot().as_ref()],
        |r| r.get(0),
      )
      .optional()?;
    if let Some(item_id) = unclaimed {
      conn.execute(
        "UPDATE checklist_items SET record_id = ?2 WHERE item_id = ?1",
        params![item_id, record_id],
      )?;
      return Ok(item_id);
    }
  }

  let item_id = insert_item(conn, cycle_id, section.slot(), section.item_name(), 0.0, Some(record_id))?;
  tracing::debug!(cycle_id, section = section.as_ref(), item_id, "created checklist item for section");
  Ok(item_id)
}

pub fn save_section(
  conn: &mut Connection,
  cycle_id: i64,
  payload: SectionPayload,
) -> Result<Option<SectionView>> {
  let section = payload.section();
  let tx = conn.transaction()?;
  if !cycle_exists(&tx, cycle_id)? {
    return Ok(None);
  }

  let record = record_or_create(&tx, cycle_id, section)?;
  let record_id = record.record_id;
  let completion = completion::section_completion(&payload.fields, &payload.rows);

  tx.execute(
    "UPDATE section_records
        SET fields_json = ?2, completion_percentage = ?3, updated_at = ?4
      WHERE record_id = ?1",
    params![
      record_id,
      payload.fields.to_json()?.to_string(),
      completion,
      encode_dt(Utc::now()),
    ],
  )?;

  tx.execute("DELETE FROM section_rows WHERE record_id = ?1", params![record_id])?;
  {
    let mut insert = tx.prepare(
      "INSERT INTO section_rows (record_id, collection, position, data_json)
       VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut positions = std::collections::HashMap::new();
    for row in &payload.rows {
      let collection = row.collection();
      let position = positions.entry(collection).or_insert(0_i64);
      insert.execute(params![
        record_id,
        collection.as_ref(),
        *position,
        row.to_json()?.to_string(),
      ])?;
      *position += 1;
    }
  }

  let item_id = claim_item(&tx, cycle_id, section, record_id)?;
  tx.execute(
    "UPDATE checklist_items SET completion_percentage = ?2, status = ?3 WHERE item_id = ?1",
    params![item_id, completion, status_for(completion)],
  )?;
  refresh_progress_in(&tx, cycle_id)?;

  let record = find_record(&tx, cycle_id, section)?;
  let view = record.map(|r| view_of(&tx, r)).transpose()?;
  tx.commit()?;
  Ok(view)
}
