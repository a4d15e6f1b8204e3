//! Courses, instructor syllabus sections and the cascading section delete.

use abet_core::course::{
  Assessment, CloAssignment, Course, CourseInput, CourseRef, InstructorSyllabus,
  Supplement, SyllabusContent, SyllabusRecord, SyllabusUpdate, Textbook,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{Result, encode::encode_dt, programs::cycle_exists};

// ─── Courses ─────────────────────────────────────────────────────────────────

const COURSE_SELECT: &str = "
  SELECT c.course_id, c.cycle_id, y.program_id, c.course_code, c.course_title,
         c.credits, c.contact_hours, c.course_type, c.unified_syllabus_id
    FROM courses c JOIN cycles y ON y.cycle_id = c.cycle_id";

fn course_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
  Ok(Course {
    course_id:           row.get(0)?,
    cycle_id:            row.get(1)?,
    program_id:          row.get(2)?,
    course_code:         row.get(3)?,
    course_title:        row.get(4)?,
    credits:             row.get(5)?,
    contact_hours:       row.get(6)?,
    course_type:         row.get(7)?,
    unified_syllabus_id: row.get(8)?,
  })
}

pub fn list_courses(conn: &Connection, program_id: i64, cycle_id: Option<i64>) -> Result<Vec<Course>> {
  let mut stmt = conn.prepare(&format!(
    "{COURSE_SELECT}
      WHERE y.program_id = ?1 AND (?2 IS NULL OR c.cycle_id = ?2)
      ORDER BY c.course_code"
  ))?;
  let courses = stmt
    .query_map(params![program_id, cycle_id], course_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(courses)
}

pub fn get_course(conn: &Connection, course_id: i64) -> Result<Option<Course>> {
  Ok(
    conn
      .query_row(
        &format!("{COURSE_SELECT} WHERE c.course_id = ?1"),
        params![course_id],
        course_from_row,
      )
      .optional()?,
  )
}

pub fn course_code_taken(
  conn: &Connection,
  cycle_id: i64,
  code: &str,
  except: Option<i64>,
) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM courses
          WHERE cycle_id = ?1 AND course_code = ?2 COLLATE NOCASE
            AND (?3 IS NULL OR course_id != ?3)",
        params![cycle_id, code, except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub fn create_course(conn: &Connection, input: CourseInput) -> Result<Option<Course>> {
  let Some(cycle_id) = input.cycle_id else {
    return Ok(None);
  };
  if !cycle_exists(conn, cycle_id)? {
    return Ok(None);
  }
  conn.execute(
    "INSERT INTO courses
       (cycle_id, course_code, course_title, credits, contact_hours, course_type)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      cycle_id,
      input.course_code,
      input.course_title,
      input.credits.unwrap_or(0.0),
      input.contact_hours.unwrap_or(0.0),
      input.course_type,
    ],
  )?;
  get_course(conn, conn.last_insert_rowid())
}

pub fn update_course(conn: &Connection, course_id: i64, input: CourseInput) -> Result<Option<Course>> {
  let changed = conn.execute(
    "UPDATE courses
        SET course_code = ?2, course_title = ?3, credits = ?4,
            contact_hours = ?5, course_type = ?6
      WHERE course_id = ?1",
    params![
      course_id,
      input.course_code,
      input.course_title,
      input.credits.unwrap_or(0.0),
      input.contact_hours.unwrap_or(0.0),
      input.course_type,
    ],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  get_course(conn, course_id)
}

/// Delete every section of the course, its CLOs, the course, and finally its
/// unified syllabus if nothing else references it.
pub(crate) fn delete_course_in(conn: &Connection, course_id: i64) -> Result<()> {
  let unified: Option<i64> = conn
    .query_row(
      "SELECT unified_syllabus_id FROM courses WHERE course_id = ?1",
      params![course_id],
      |r| r.get(0),
    )
    .optional()?
    .flatten();

  for section_id in section_ids(conn, course_id)? {
    delete_section_in(conn, section_id)?;
  }
  conn.execute("DELETE FROM course_learning_outcomes WHERE course_id = ?1", params![course_id])?;
  conn.execute("DELETE FROM courses WHERE course_id = ?1", params![course_id])?;
  if let Some(unified_id) = unified {
    delete_unified_if_orphaned(conn, unified_id)?;
  }
  Ok(())
}

pub fn delete_course(conn: &mut Connection, course_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  if get_course(&tx, course_id)?.is_none() {
    return Ok(false);
  }
  delete_course_in(&tx, course_id)?;
  tx.commit()?;
  Ok(true)
}

// ─── Sections ────────────────────────────────────────────────────────────────

const SECTION_COLUMNS: &str = "section_id, course_id, faculty_id, term, unified_syllabus_id,
  description_id, outline_id, additional_info_id";

fn section_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<InstructorSyllabus> {
  Ok(InstructorSyllabus {
    section_id:          row.get(0)?,
    course_id:           row.get(1)?,
    faculty_id:          row.get(2)?,
    term:                row.get(3)?,
    unified_syllabus_id: row.get(4)?,
    description_id:      row.get(5)?,
    outline_id:          row.get(6)?,
    additional_info_id:  row.get(7)?,
  })
}

fn section_ids(conn: &Connection, course_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare("SELECT section_id FROM instructor_syllabi WHERE course_id = ?1")?;
  let ids = stmt
    .query_map(params![course_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;
  Ok(ids)
}

pub fn list_sections(conn: &Connection, course_id: i64) -> Result<Vec<InstructorSyllabus>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SECTION_COLUMNS} FROM instructor_syllabi WHERE course_id = ?1 ORDER BY section_id"
  ))?;
  let sections = stmt
    .query_map(params![course_id], section_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(sections)
}

fn get_section(conn: &Connection, course_id: i64, section_id: i64) -> Result<Option<InstructorSyllabus>> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {SECTION_COLUMNS} FROM instructor_syllabi
            WHERE section_id = ?1 AND course_id = ?2"
        ),
        params![section_id, course_id],
        section_from_row,
      )
      .optional()?,
  )
}

pub fn faculty_has_section(
  conn: &Connection,
  course_id: i64,
  faculty_id: i64,
  except: Option<i64>,
) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM instructor_syllabi
          WHERE course_id = ?1 AND faculty_id = ?2 AND (?3 IS NULL OR section_id != ?3)",
        params![course_id, faculty_id, except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Shared rows of a new section: the first sibling's when the course already
/// has sections, otherwise fresh rows under the course's unified syllabus
/// (created and adopted by the course if it has none).
fn shared_rows_for(conn: &Connection, course: &Course) -> Result<(i64, i64, i64, i64)> {
  let sibling = conn
    .query_row(
      "SELECT unified_syllabus_id, description_id, outline_id, additional_info_id
         FROM instructor_syllabi WHERE course_id = ?1 ORDER BY section_id LIMIT 1",
      params![course.course_id],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )
    .optional()?;
  if let Some(ids) = sibling {
    return Ok(ids);
  }

  let unified_id = match course.unified_syllabus_id {
    Some(id) => id,
    None => {
      conn.execute(
        "INSERT INTO unified_syllabi (created_at) VALUES (?1)",
        params![encode_dt(Utc::now())],
      )?;
      let id = conn.last_insert_rowid();
      conn.execute(
        "UPDATE courses SET unified_syllabus_id = ?2 WHERE course_id = ?1",
        params![course.course_id, id],
      )?;
      id
    }
  };
  conn.execute("INSERT INTO syllabus_descriptions (catalog_description) VALUES ('')", [])?;
  let description_id = conn.last_insert_rowid();
  conn.execute("INSERT INTO syllabus_outlines (weekly_topics) VALUES ('')", [])?;
  let outline_id = conn.last_insert_rowid();
  conn.execute(
    "INSERT INTO syllabus_additional_info (design_content_percentage, software_or_labs_tools_used)
     VALUES (0, '')",
    [],
  )?;
  let info_id = conn.last_insert_rowid();
  Ok((unified_id, description_id, outline_id, info_id))
}

pub fn create_section(
  conn: &mut Connection,
  course_id: i64,
  faculty_id: i64,
  term: String,
) -> Result<Option<InstructorSyllabus>> {
  let tx = conn.transaction()?;
  let Some(course) = get_course(&tx, course_id)? else {
    return Ok(None);
  };
  let (unified_id, description_id, outline_id, info_id) = shared_rows_for(&tx, &course)?;
  tx.execute(
    "INSERT INTO instructor_syllabi
       (course_id, faculty_id, term, unified_syllabus_id,
        description_id, outline_id, additional_info_id)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![course_id, faculty_id, term, unified_id, description_id, outline_id, info_id],
  )?;
  let section = get_section(&tx, course_id, tx.last_insert_rowid())?;
  tx.commit()?;
  Ok(section)
}

// ─── Syllabus content ────────────────────────────────────────────────────────

fn strings(conn: &Connection, sql: &str, section_id: i64) -> Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  let values = stmt
    .query_map(params![section_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(values)
}

fn load_content(conn: &Connection, section: &InstructorSyllabus) -> Result<SyllabusContent> {
  let catalog_description: String = conn.query_row(
    "SELECT catalog_description FROM syllabus_descriptions WHERE description_id = ?1",
    params![section.description_id],
    |r| r.get(0),
  )?;
  let weekly_topics: String = conn.query_row(
    "SELECT weekly_topics FROM syllabus_outlines WHERE outline_id = ?1",
    params![section.outline_id],
    |r| r.get(0),
  )?;
  let (design_content_percentage, software_or_labs_tools_used): (f64, String) = conn.query_row(
    "SELECT design_content_percentage, software_or_labs_tools_used
       FROM syllabus_additional_info WHERE additional_info_id = ?1",
    params![section.additional_info_id],
    |r| Ok((r.get(0)?, r.get(1)?)),
  )?;

  let sid = section.section_id;

  let mut stmt = conn.prepare(
    "SELECT title_author_year, attribute FROM syllabus_textbooks
      WHERE section_id = ?1 ORDER BY position",
  )?;
  let textbooks = stmt
    .query_map(params![sid], |r| {
      Ok(Textbook { title_author_year: r.get(0)?, attribute: r.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT assessment_type, weight_percentage FROM syllabus_assessments
      WHERE section_id = ?1 ORDER BY position",
  )?;
  let assessments = stmt
    .query_map(params![sid], |r| {
      Ok(Assessment { assessment_type: r.get(0)?, weight_percentage: r.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let supplements = strings(
    conn,
    "SELECT material_description FROM syllabus_supplements WHERE section_id = ?1 ORDER BY position",
    sid,
  )?
  .into_iter()
  .map(|material_description| Supplement { material_description })
  .collect();
  let prerequisites = strings(
    conn,
    "SELECT course_code FROM syllabus_prerequisites WHERE section_id = ?1 ORDER BY position",
    sid,
  )?
  .into_iter()
  .map(|course_code| CourseRef { course_code })
  .collect();
  let corequisites = strings(
    conn,
    "SELECT course_code FROM syllabus_corequisites WHERE section_id = ?1 ORDER BY position",
    sid,
  )?
  .into_iter()
  .map(|course_code| CourseRef { course_code })
  .collect();

  let mut stmt = conn.prepare(
    "SELECT clo_id, so_id FROM syllabus_clo_so_mappings WHERE section_id = ?1
     UNION ALL
     SELECT clo_id, NULL FROM syllabus_clo_assignments WHERE section_id = ?1
     ORDER BY 1, 2",
  )?;
  let clo_mappings = stmt
    .query_map(params![sid], |r| Ok(CloAssignment { clo_id: r.get(0)?, so_id: r.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(SyllabusContent {
    catalog_description,
    weekly_topics,
    design_content_percentage,
    software_or_labs_tools_used,
    textbooks,
    supplements,
    prerequisites,
    corequisites,
    assessments,
    clo_mappings,
  })
}

pub fn syllabus(conn: &Connection, course_id: i64, section_id: i64) -> Result<Option<SyllabusRecord>> {
  let Some(section) = get_section(conn, course_id, section_id)? else {
    return Ok(None);
  };
  let content = load_content(conn, &section)?;
  Ok(Some(SyllabusRecord { section, content }))
}

const CHILD_TABLES: [&str; 7] = [
  "syllabus_assessments",
  "syllabus_supplements",
  "syllabus_textbooks",
  "syllabus_prerequisites",
  "syllabus_corequisites",
  "syllabus_clo_so_mappings",
  "syllabus_clo_assignments",
];

fn clear_children(conn: &Connection, section_id: i64) -> Result<()> {
  for table in CHILD_TABLES {
    conn.execute(&format!("DELETE FROM {table} WHERE section_id = ?1"), params![section_id])?;
  }
  Ok(())
}

fn write_content(conn: &Connection, section: &InstructorSyllabus, content: &SyllabusContent) -> Result<()> {
  conn.execute(
    "UPDATE syllabus_descriptions SET catalog_description = ?2 WHERE description_id = ?1",
    params![section.description_id, content.catalog_description],
  )?;
  conn.execute(
    "UPDATE syllabus_outlines SET weekly_topics = ?2 WHERE outline_id = ?1",
    params![section.outline_id, content.weekly_topics],
  )?;
  conn.execute(
    "UPDATE syllabus_additional_info
        SET design_content_percentage = ?2, software_or_labs_tools_used = ?3
      WHERE additional_info_id = ?1",
    params![
      section.additional_info_id,
      content.design_content_percentage,
      content.software_or_labs_tools_used,
    ],
  )?;

  let sid = section.section_id;
  clear_children(conn, sid)?;

  for (pos, t) in content.textbooks.iter().enumerate() {
    conn.execute(
      "INSERT INTO syllabus_textbooks (section_id, position, title_author_year, attribute)
       VALUES (?1, ?2, ?3, ?4)",
      params![sid, pos as i64, t.title_author_year, t.attribute],
    )?;
  }
  for (pos, s) in content.supplements.iter().enumerate() {
    conn.execute(
      "INSERT INTO syllabus_supplements (section_id, position, material_description)
       VALUES (?1, ?2, ?3)",
      params![sid, pos as i64, s.material_description],
    )?;
  }
  for (table, list) in [
    ("syllabus_prerequisites", &content.prerequisites),
    ("syllabus_corequisites", &content.corequisites),
  ] {
    for (pos, r) in list.iter().enumerate() {
      conn.execute(
        &format!("INSERT INTO {table} (section_id, position, course_code) VALUES (?1, ?2, ?3)"),
        params![sid, pos as i64, r.course_code],
      )?;
    }
  }
  for (pos, a) in content.assessments.iter().enumerate() {
    conn.execute(
      "INSERT INTO syllabus_assessments (section_id, position, assessment_type, weight_percentage)
       VALUES (?1, ?2, ?3, ?4)",
      params![sid, pos as i64, a.assessment_type, a.weight_percentage],
    )?;
  }
  for m in &content.clo_mappings {
    match m.so_id {
      Some(so_id) => conn.execute(
        "INSERT OR IGNORE INTO syllabus_clo_so_mappings (section_id, clo_id, so_id)
         VALUES (?1, ?2, ?3)",
        params![sid, m.clo_id, so_id],
      )?,
      None => conn.execute(
        "INSERT OR IGNORE INTO syllabus_clo_assignments (section_id, clo_id) VALUES (?1, ?2)",
        params![sid, m.clo_id],
      )?,
    };
  }
  Ok(())
}

pub fn save_syllabus(
  conn: &mut Connection,
  course_id: i64,
  section_id: i64,
  update: SyllabusUpdate,
) -> Result<Option<SyllabusRecord>> {
  let tx = conn.transaction()?;
  let Some(mut section) = get_section(&tx, course_id, section_id)? else {
    return Ok(None);
  };
  let Some(course) = get_course(&tx, course_id)? else {
    return Ok(None);
  };

  let c = &update.course;
  tx.execute(
    "UPDATE courses
        SET course_code = ?2, course_title = ?3, credits = ?4,
            contact_hours = ?5, course_type = ?6
      WHERE course_id = ?1",
    params![
      course_id,
      c.course_code,
      c.course_title.as_deref().unwrap_or(&course.course_title),
      c.credits.unwrap_or(course.credits),
      c.contact_hours.unwrap_or(course.contact_hours),
      c.course_type,
    ],
  )?;

  section.term = update.section.term.clone();
  if let Some(faculty_id) = update.section.faculty_id {
    section.faculty_id = faculty_id;
  }
  tx.execute(
    "UPDATE instructor_syllabi SET term = ?2, faculty_id = ?3 WHERE section_id = ?1",
    params![section_id, section.term, section.faculty_id],
  )?;

  write_content(&tx, &section, &update.syllabus)?;
  let content = load_content(&tx, &section)?;
  tx.commit()?;
  Ok(Some(SyllabusRecord { section, content }))
}

// ─── Cascading delete ────────────────────────────────────────────────────────

fn delete_unified_if_orphaned(conn: &Connection, unified_id: i64) -> Result<()> {
  conn.execute(
    "DELETE FROM unified_syllabi
      WHERE unified_syllabus_id = ?1
        AND NOT EXISTS (SELECT 1 FROM courses WHERE unified_syllabus_id = ?1)
        AND NOT EXISTS (SELECT 1 FROM instructor_syllabi WHERE unified_syllabus_id = ?1)",
    params![unified_id],
  )?;
  Ok(())
}

/// Delete one section: its exclusive children, the section itself, then each
/// shared lookup row no remaining section references, then the unified
/// syllabus if neither a course nor a section still references it.
pub(crate) fn delete_section_in(conn: &Connection, section_id: i64) -> Result<bool> {
  let shared: Option<(i64, i64, i64, i64)> = conn
    .query_row(
      "SELECT unified_syllabus_id, description_id, outline_id, additional_info_id
         FROM instructor_syllabi WHERE section_id = ?1",
      params![section_id],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )
    .optional()?;
  let Some((unified_id, description_id, outline_id, info_id)) = shared else {
    return Ok(false);
  };

  clear_children(conn, section_id)?;
  conn.execute("DELETE FROM instructor_syllabi WHERE section_id = ?1", params![section_id])?;

  for (table, column, id) in [
    ("syllabus_descriptions", "description_id", description_id),
    ("syllabus_outlines", "outline_id", outline_id),
    ("syllabus_additional_info", "additional_info_id", info_id),
  ] {
    conn.execute(
      &format!(
        "DELETE FROM {table} WHERE {column} = ?1
           AND NOT EXISTS (SELECT 1 FROM instructor_syllabi WHERE {column} = ?1)"
      ),
      params![id],
    )?;
  }
  delete_unified_if_orphaned(conn, unified_id)?;
  Ok(true)
}

pub fn delete_section(conn: &mut Connection, course_id: i64, section_id: i64) -> Result<bool> {
  let tx = conn.transaction()?;
  if get_section(&tx, course_id, section_id)?.is_none() {
    return Ok(false);
  }
  let deleted = delete_section_in(&tx, section_id)?;
  tx.commit()?;
  Ok(deleted)
}

/// Sections taught by a member, for the faculty delete.
pub(crate) fn faculty_section_ids(conn: &Connection, faculty_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare("SELECT section_id FROM instructor_syllabi WHERE faculty_id = ?1")?;
  let ids = stmt
    .query_map(params![faculty_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;
  Ok(ids)
}
