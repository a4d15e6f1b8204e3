//! Programs and cycles.

use abet_core::program::{Cycle, Program, ProgramInput};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result, courses,
  encode::{CYCLE_COLUMNS, RawCycle, encode_dt},
};

// ─── Programs ────────────────────────────────────────────────────────────────

fn program_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Program> {
  Ok(Program {
    program_id:    row.get(0)?,
    program_name:  row.get(1)?,
    program_level: row.get(2)?,
  })
}

pub fn list_programs(conn: &Connection) -> Result<Vec<Program>> {
  let mut stmt = conn.prepare(
    "SELECT program_id, program_name, program_level FROM programs ORDER BY program_name",
  )?;
  let programs = stmt
    .query_map([], program_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(programs)
}

pub fn get_program(conn: &Connection, program_id: i64) -> Result<Option<Program>> {
  Ok(
    conn
      .query_row(
        "SELECT program_id, program_name, program_level FROM programs WHERE program_id = ?1",
        params![program_id],
        program_from_row,
      )
      .optional()?,
  )
}

pub fn program_exists(conn: &Connection, program_id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM programs WHERE program_id = ?1",
        params![program_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub fn program_name_taken(conn: &Connection, name: &str, except: Option<i64>) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM programs
          WHERE program_name = ?1 COLLATE NOCASE
            AND (?2 IS NULL OR program_id != ?2)",
        params![name.trim(), except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub fn create_program(conn: &Connection, input: ProgramInput) -> Result<Program> {
  conn.execute(
    "INSERT INTO programs (program_name, program_level) VALUES (?1, ?2)",
    params![input.program_name, input.program_level],
  )?;
  Ok(Program {
    program_id:    conn.last_insert_rowid(),
    program_name:  input.program_name,
    program_level: input.program_level,
  })
}

pub fn update_program(
  conn: &Connection,
  program_id: i64,
  input: ProgramInput,
) -> Result<Option<Program>> {
  let changed = conn.execute(
    "UPDATE programs SET program_name = ?2, program_level = ?3 WHERE program_id = ?1",
    params![program_id, input.program_name, input.program_level],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_program(conn, program_id)
}

/// Cycles' courses go through the course delete; everything else owned by
/// the program cascades.
pub fn delete_program(conn: &mut Connection, program_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  if !program_exists(&tx, program_id)? {
    return Ok(false);
  }
  for cycle_id in cycle_ids(&tx, program_id)? {
    delete_cycle_in(&tx, cycle_id)?;
  }
  tx.execute("DELETE FROM programs WHERE program_id = ?1", params![program_id])?;
  tx.commit()?;
  Ok(true)
}

// ─── Cycles ──────────────────────────────────────────────────────────────────

fn cycle_ids(conn: &Connection, program_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare("SELECT cycle_id FROM cycles WHERE program_id = ?1")?;
  let ids = stmt
    .query_map(params![program_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;
  Ok(ids)
}

pub fn list_cycles(conn: &Connection, program_id: i64) -> Result<Vec<Cycle>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {CYCLE_COLUMNS} FROM cycles WHERE program_id = ?1 ORDER BY start_year, cycle_id"
  ))?;
  let raws = stmt
    .query_map(params![program_id], RawCycle::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawCycle::into_cycle).collect()
}

pub fn get_cycle(conn: &Connection, cycle_id: i64) -> Result<Option<Cycle>> {
  let raw = conn
    .query_row(
      &format!("SELECT {CYCLE_COLUMNS} FROM cycles WHERE cycle_id = ?1"),
      params![cycle_id],
      RawCycle::from_row,
    )
    .optional()?;
  raw.map(RawCycle::into_cycle).transpose()
}

pub fn cycle_exists(conn: &Connection, cycle_id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM cycles WHERE cycle_id = ?1", params![cycle_id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub fn create_cycle(
  conn: &Connection,
  program_id: i64,
  start_year: i32,
  end_year: i32,
) -> Result<Option<Cycle>> {
  if !program_exists(conn, program_id)? {
    return Ok(None);
  }
  conn.execute(
    "INSERT INTO cycles (program_id, start_year, end_year, overall_progress_percentage, created_at)
     VALUES (?1, ?2, ?3, 0, ?4)",
    params![program_id, start_year, end_year, encode_dt(Utc::now())],
  )?;
  get_cycle(conn, conn.last_insert_rowid())
}

pub fn update_cycle(
  conn: &Connection,
  cycle_id: i64,
  start_year: i32,
  end_year: i32,
) -> Result<Option<Cycle>> {
  let changed = conn.execute(
    "UPDATE cycles SET start_year = ?2, end_year = ?3 WHERE cycle_id = ?1",
    params![cycle_id, start_year, end_year],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_cycle(conn, cycle_id)
}

/// Deletes the cycle's courses (and their sections) first; checklist items,
/// section records and evidence cascade.
pub(crate) fn delete_cycle_in(conn: &Connection, cycle_id: i64) -> Result<()> {
  let mut stmt = conn.prepare("SELECT course_id FROM courses WHERE cycle_id = ?1")?;
  let course_ids = stmt
    .query_map(params![cycle_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;
  for course_id in course_ids {
    courses::delete_course_in(conn, course_id)?;
  }
  conn.execute("DELETE FROM cycles WHERE cycle_id = ?1", params![cycle_id])?;
  Ok(())
}

pub fn delete_cycle(conn: &mut Connection, cycle_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  if !cycle_exists(&tx, cycle_id)? {
    return Ok(false);
  }
  delete_cycle_in(&tx, cycle_id)?;
  tx.commit()?;
  Ok(true)
}
