//! Evidence file metadata.

use abet_core::evidence::{EvidenceFile, NewEvidence};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  encode::{EVIDENCE_COLUMNS, RawEvidence, encode_date},
  programs::cycle_exists,
};

pub fn list_evidence(conn: &Connection, cycle_id: i64) -> Result<Vec<EvidenceFile>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {EVIDENCE_COLUMNS} FROM evidence_files
      WHERE cycle_id = ?1 ORDER BY upload_date DESC, evidence_id"
  ))?;
  let raws = stmt
    .query_map(params![cycle_id], RawEvidence::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawEvidence::into_evidence).collect()
}

pub fn get_evidence(conn: &Connection, evidence_id: i64) -> Result<Option<EvidenceFile>> {
  let raw = conn
    .query_row(
      &format!("SELECT {EVIDENCE_COLUMNS} FROM evidence_files WHERE evidence_id = ?1"),
      params![evidence_id],
      RawEvidence::from_row,
    )
    .optional()?;
  raw.map(RawEvidence::into_evidence).transpose()
}

pub fn create_evidence(
  conn: &Connection,
  cycle_id: i64,
  user_id: i64,
  input: NewEvidence,
) -> Result<Option<EvidenceFile>> {
  if !cycle_exists(conn, cycle_id)? {
    return Ok(None);
  }
  conn.execute(
    "INSERT INTO evidence_files (cycle_id, user_id, file_name, file_type, upload_date)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![cycle_id, user_id, input.file_name, input.file_type, encode_date(input.upload_date)],
  )?;
  Ok(Some(EvidenceFile {
    evidence_id: conn.last_insert_rowid(),
    cycle_id,
    user_id,
    file_name: input.file_name,
    file_type: input.file_type,
    upload_date: input.upload_date,
  }))
}

pub fn update_evidence(
  conn: &Connection,
  evidence_id: i64,
  input: NewEvidence,
) -> Result<Option<EvidenceFile>> {
  let changed = conn.execute(
    "UPDATE evidence_files SET file_name = ?2, file_type = ?3, upload_date = ?4
      WHERE evidence_id = ?1",
    params![evidence_id, input.file_name, input.file_type, encode_date(input.upload_date)],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_evidence(conn, evidence_id)
}

pub fn delete_evidence(conn: &Connection, evidence_id: i64) -> Result<bool> {
  let deleted =
    conn.execute("DELETE FROM evidence_files WHERE evidence_id = ?1", params![evidence_id])?;
  Ok(deleted > 0)
}
