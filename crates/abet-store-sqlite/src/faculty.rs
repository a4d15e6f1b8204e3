//! Faculty members, program assignments, dependent rows and profiles.

use abet_core::{
  faculty::{FacultyInput, FacultyMember, FacultyProfile, FacultyRecords, TaughtSection},
  program::Program,
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{Result, courses, encode::decode_faculty_collection};

const MEMBER_COLUMNS: &str =
  "faculty_id, full_name, academic_rank, appointment_type, email, phone, office_hours";

fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FacultyMember> {
  Ok(FacultyMember {
    faculty_id:       row.get(0)?,
    full_name:        row.get(1)?,
    academic_rank:    row.get(2)?,
    appointment_type: row.get(3)?,
    email:            row.get(4)?,
    phone:            row.get(5)?,
    office_hours:     row.get(6)?,
  })
}

pub fn list_faculty(conn: &Connection) -> Result<Vec<FacultyMember>> {
  let mut stmt =
    conn.prepare(&format!("SELECT {MEMBER_COLUMNS} FROM faculty_members ORDER BY full_name"))?;
  let members = stmt
    .query_map([], member_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(members)
}

pub fn get_faculty(conn: &Connection, faculty_id: i64) -> Result<Option<FacultyMember>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {MEMBER_COLUMNS} FROM faculty_members WHERE faculty_id = ?1"),
        params![faculty_id],
        member_from_row,
      )
      .optional()?,
  )
}

pub fn email_taken(conn: &Connection, email: &str, except: Option<i64>) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM faculty_members
          WHERE email = ?1 COLLATE NOCASE AND (?2 IS NULL OR faculty_id != ?2)",
        params![email.trim(), except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub fn create_faculty(conn: &Connection, input: FacultyInput) -> Result<FacultyMember> {
  conn.execute(
    "INSERT INTO faculty_members
       (full_name, academic_rank, appointment_type, email, phone, office_hours)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      input.full_name,
      input.academic_rank,
      input.appointment_type,
      input.email,
      input.phone,
      input.office_hours,
    ],
  )?;
  Ok(FacultyMember {
    faculty_id:       conn.last_insert_rowid(),
    full_name:        input.full_name,
    academic_rank:    input.academic_rank,
    appointment_type: input.appointment_type,
    email:            input.email,
    phone:            input.phone,
    office_hours:     input.office_hours,
  })
}

pub fn update_faculty(
  conn: &Connection,
  faculty_id: i64,
  input: FacultyInput,
) -> Result<Option<FacultyMember>> {
  let changed = conn.execute(
    "UPDATE faculty_members
        SET full_name = ?2, academic_rank = ?3, appointment_type = ?4,
            email = ?5, phone = ?6, office_hours = ?7
      WHERE faculty_id = ?1",
    params![
      faculty_id,
      input.full_name,
      input.academic_rank,
      input.appointment_type,
      input.email,
      input.phone,
      input.office_hours,
    ],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_faculty(conn, faculty_id)
}

/// Sections taught by the member go through the cascading section delete;
/// assignments and dependent rows cascade.
pub fn delete_faculty(conn: &mut Connection, faculty_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  if get_faculty(&tx, faculty_id)?.is_none() {
    return Ok(false);
  }
  for section_id in courses::faculty_section_ids(&tx, faculty_id)? {
    courses::delete_section_in(&tx, section_id)?;
  }
  tx.execute("DELETE FROM faculty_members WHERE faculty_id = ?1", params![faculty_id])?;
  tx.commit()?;
  Ok(true)
}

// ─── Profile ─────────────────────────────────────────────────────────────────

fn assigned_programs(conn: &Connection, faculty_id: i64) -> Result<Vec<Program>> {
  let mut stmt = conn.prepare(
    "SELECT p.program_id, p.program_name, p.program_level
       FROM faculty_program_assignments a JOIN programs p ON p.program_id = a.program_id
      WHERE a.faculty_id = ?1
      ORDER BY p.program_name",
  )?;
  let programs = stmt
    .query_map(params![faculty_id], |r| {
      Ok(Program { program_id: r.get(0)?, program_name: r.get(1)?, program_level: r.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(programs)
}

fn records(conn: &Connection, faculty_id: i64) -> Result<FacultyRecords> {
  let mut stmt = conn.prepare(
    "SELECT collection, data_json FROM faculty_rows
      WHERE faculty_id = ?1 ORDER BY collection, position",
  )?;
  let raws = stmt
    .query_map(params![faculty_id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut records = FacultyRecords::default();
  for (collection, data) in raws {
    let collection = decode_faculty_collection(&collection)?;
    records.rows_mut(collection).push(serde_json::from_str(&data)?);
  }
  Ok(records)
}

fn taught_sections(conn: &Connection, faculty_id: i64) -> Result<Vec<TaughtSection>> {
  let mut stmt = conn.prepare(
    "SELECT s.section_id, s.course_id, c.course_code, s.term
       FROM instructor_syllabi s JOIN courses c ON c.course_id = s.course_id
      WHERE s.faculty_id = ?1
      ORDER BY c.course_code, s.section_id",
  )?;
  let sections = stmt
    .query_map(params![faculty_id], |r| {
      Ok(TaughtSection {
        section_id:  r.get(0)?,
        course_id:   r.get(1)?,
        course_code: r.get(2)?,
        term:        r.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(sections)
}

pub fn profile(conn: &Connection, faculty_id: i64) -> Result<Option<FacultyProfile>> {
  let Some(member) = get_faculty(conn, faculty_id)? else {
    return Ok(None);
  };
  Ok(Some(FacultyProfile {
    member,
    programs: assigned_programs(conn, faculty_id)?,
    records: records(conn, faculty_id)?,
    sections: taught_sections(conn, faculty_id)?,
  }))
}

pub fn save_profile(
  conn: &mut Connection,
  faculty_id: i64,
  member: Option<FacultyInput>,
  records: FacultyRecords,
) -> Result<Option<FacultyProfile>> {
  let tx = conn.transaction()?;
  if get_faculty(&tx, faculty_id)?.is_none() {
    return Ok(None);
  }
  if let Some(input) = member {
    update_faculty(&tx, faculty_id, input)?;
  }

  tx.execute("DELETE FROM faculty_rows WHERE faculty_id = ?1", params![faculty_id])?;
  {
    let mut insert = tx.prepare(
      "INSERT INTO faculty_rows (faculty_id, collection, position, data_json)
       VALUES (?1, ?2, ?3, ?4)",
    )?;
    for collection in FacultyRecords::COLLECTIONS {
      for (pos, row) in records.rows(collection).iter().enumerate() {
        insert.execute(params![
          faculty_id,
          collection.as_ref(),
          pos as i64,
          serde_json::to_string(row)?,
        ])?;
      }
    }
  }

  let saved = profile(&tx, faculty_id)?;
  tx.commit()?;
  Ok(saved)
}

pub fn replace_programs(
  conn: &mut Connection,
  faculty_id: i64,
  program_ids: Vec<i64>,
) -> Result<Option<Vec<Program>>> {
  let tx = conn.transaction()?;
  if get_faculty(&tx, faculty_id)?.is_none() {
    return Ok(None);
  }
  tx.execute(
    "DELETE FROM faculty_program_assignments WHERE faculty_id = ?1",
    params![faculty_id],
  )?;
  {
    let mut insert = tx.prepare(
      "INSERT OR IGNORE INTO faculty_program_assignments (faculty_id, program_id)
       VALUES (?1, ?2)",
    )?;
    for program_id in program_ids {
      insert.execute(params![faculty_id, program_id])?;
    }
  }
  let programs = assigned_programs(&tx, faculty_id)?;
  tx.commit()?;
  Ok(Some(programs))
}
