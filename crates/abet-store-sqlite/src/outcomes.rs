//! Outcomes (SO, PEO, CLO) and their replace-on-write mappings.
//!
//! The three outcome kinds live in separate tables with identical shapes;
//! [`Table`] names the columns for each.

use abet_core::outcome::{
  CloSoMapping, Outcome, OutcomeInput, OutcomeKind, SoPeoMapping, dedupe_pairs,
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::Result;

struct Table {
  name:        &'static str,
  id:          &'static str,
  owner:       &'static str,
  owner_table: &'static str,
}

fn table(kind: OutcomeKind) -> Table {
  match kind {
    OutcomeKind::So => Table {
      name:        "student_outcomes",
      id:          "so_id",
      owner:       "program_id",
      owner_table: "programs",
    },
    OutcomeKind::Peo => Table {
      name:        "peos",
      id:          "peo_id",
      owner:       "program_id",
      owner_table: "programs",
    },
    OutcomeKind::Clo => Table {
      name:        "course_learning_outcomes",
      id:          "clo_id",
      owner:       "course_id",
      owner_table: "courses",
    },
  }
}

pub fn list_outcomes(conn: &Connection, kind: OutcomeKind, owner_id: i64) -> Result<Vec<Outcome>> {
  let t = table(kind);
  let mut stmt = conn.prepare(&format!(
    "SELECT {id}, {owner}, code, description FROM {name} WHERE {owner} = ?1 ORDER BY code, {id}",
    id = t.id,
    owner = t.owner,
    name = t.name,
  ))?;
  let outcomes = stmt
    .query_map(params![owner_id], |r| {
      Ok(Outcome {
        outcome_id:  r.get(0)?,
        kind,
        owner_id:    r.get(1)?,
        code:        r.get(2)?,
        description: r.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(outcomes)
}

pub fn get_outcome(conn: &Connection, kind: OutcomeKind, outcome_id: i64) -> Result<Option<Outcome>> {
  let t = table(kind);
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {id}, {owner}, code, description FROM {name} WHERE {id} = ?1",
          id = t.id,
          owner = t.owner,
          name = t.name,
        ),
        params![outcome_id],
        |r| {
          Ok(Outcome {
            outcome_id:  r.get(0)?,
            kind,
            owner_id:    r.get(1)?,
            code:        r.get(2)?,
            description: r.get(3)?,
          })
        },
      )
      .optional()?,
  )
}

pub fn create_outcome(
  conn: &Connection,
  kind: OutcomeKind,
  owner_id: i64,
  input: OutcomeInput,
) -> Result<Option<Outcome>> {
  let t = table(kind);
  let owner_exists = conn
    .query_row(
      &format!("SELECT 1 FROM {} WHERE {} = ?1", t.owner_table, t.owner),
      params![owner_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !owner_exists {
    return Ok(None);
  }
  conn.execute(
    &format!("INSERT INTO {} ({}, code, description) VALUES (?1, ?2, ?3)", t.name, t.owner),
    params![owner_id, input.code, input.description],
  )?;
  Ok(Some(Outcome {
    outcome_id: conn.last_insert_rowid(),
    kind,
    owner_id,
    code: input.code,
    description: input.description,
  }))
}

pub fn update_outcome(
  conn: &Connection,
  kind: OutcomeKind,
  outcome_id: i64,
  input: OutcomeInput,
) -> Result<Option<Outcome>> {
  let t = table(kind);
  let changed = conn.execute(
    &format!("UPDATE {} SET code = ?2, description = ?3 WHERE {} = ?1", t.name, t.id),
    params![outcome_id, input.code, input.description],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_outcome(conn, kind, outcome_id)
}

/// Mapping rows referencing the outcome cascade through their foreign keys.
pub fn delete_outcome(conn: &Connection, kind: OutcomeKind, outcome_id: i64) -> Result<bool> {
  let t = table(kind);
  let deleted = conn.execute(
    &format!("DELETE FROM {} WHERE {} = ?1", t.name, t.id),
    params![outcome_id],
  )?;
  Ok(deleted > 0)
}

// ─── SO → PEO ────────────────────────────────────────────────────────────────

pub fn so_peo_mappings(conn: &Connection, program_id: i64) -> Result<Vec<SoPeoMapping>> {
  let mut stmt = conn.prepare(
    "SELECT m.so_id, m.peo_id FROM so_peo_mappings m
       JOIN student_outcomes s ON s.so_id = m.so_id
      WHERE s.program_id = ?1
      ORDER BY m.so_id, m.peo_id",
  )?;
  let mappings = stmt
    .query_map(params![program_id], |r| Ok(SoPeoMapping { so_id: r.get(0)?, peo_id: r.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(mappings)
}

pub fn replace_so_peo(
  conn: &mut Connection,
  program_id: i64,
  mappings: Vec<SoPeoMapping>,
) -> Result<Vec<SoPeoMapping>> {
  let tx = conn.transaction()?;
  tx.execute(
    "DELETE FROM so_peo_mappings
      WHERE so_id IN (SELECT so_id FROM student_outcomes WHERE program_id = ?1)",
    params![program_id],
  )?;
  {
    let mut insert = tx.prepare("INSERT INTO so_peo_mappings (so_id, peo_id) VALUES (?1, ?2)")?;
    for m in dedupe_pairs(mappings) {
      insert.execute(params![m.so_id, m.peo_id])?;
    }
  }
  let stored = so_peo_mappings(&tx, program_id)?;
  tx.commit()?;
  Ok(stored)
}

// ─── CLO → SO ────────────────────────────────────────────────────────────────

pub fn clo_so_mappings(conn: &Connection, course_id: i64) -> Result<Vec<CloSoMapping>> {
  let mut stmt = conn.prepare(
    "SELECT m.clo_id, m.so_id FROM clo_so_mappings m
       JOIN course_learning_outcomes c ON c.clo_id = m.clo_id
      WHERE c.course_id = ?1
      ORDER BY m.clo_id, m.so_id",
  )?;
  let mappings = stmt
    .query_map(params![course_id], |r| Ok(CloSoMapping { clo_id: r.get(0)?, so_id: r.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(mappings)
}

pub fn replace_clo_so(
  conn: &mut Connection,
  course_id: i64,
  mappings: Vec<CloSoMapping>,
) -> Result<Vec<CloSoMapping>> {
  let tx = conn.transaction()?;
  tx.execute(
    "DELETE FROM clo_so_mappings
      WHERE clo_id IN (SELECT clo_id FROM course_learning_outcomes WHERE course_id = ?1)",
    params![course_id],
  )?;
  {
    let mut insert = tx.prepare("INSERT INTO clo_so_mappings (clo_id, so_id) VALUES (?1, ?2)")?;
    for m in dedupe_pairs(mappings) {
      insert.execute(params![m.clo_id, m.so_id])?;
    }
  }
  let stored = clo_so_mappings(&tx, course_id)?;
  tx.commit()?;
  Ok(stored)
}
