//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. Tags (slots, sections, collections) are stored as their
//! lowercase names; narrative fields and rows as compact JSON.

use std::str::FromStr;

use abet_core::{
  checklist::ChecklistItem,
  evidence::EvidenceFile,
  faculty::FacultyCollection,
  program::Cycle,
  section::{RowCollection, Section, SectionFields, SectionRecord, SectionRow, StoredRow},
  slot::CriterionSlot,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── Time ────────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn decode_slot(s: &str) -> Result<CriterionSlot> {
  CriterionSlot::from_str(s)
    .map_err(|_| abet_core::Error::UnknownSlot(s.to_owned()).into())
}

pub fn decode_section(s: &str) -> Result<Section> {
  Section::from_str(s)
    .map_err(|_| abet_core::Error::UnknownSection(s.to_owned()).into())
}

pub fn decode_collection(s: &str) -> Result<RowCollection> {
  RowCollection::from_str(s)
    .map_err(|_| abet_core::Error::UnknownCollection(s.to_owned()).into())
}

pub fn decode_faculty_collection(s: &str) -> Result<FacultyCollection> {
  FacultyCollection::from_str(s)
    .map_err(|_| abet_core::Error::UnknownFacultyCollection(s.to_owned()).into())
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub const CYCLE_COLUMNS: &str =
  "cycle_id, program_id, start_year, end_year, overall_progress_percentage, created_at";

/// A `cycles` row as read from SQLite.
pub struct RawCycle {
  pub cycle_id:         i64,
  pub program_id:       i64,
  pub start_year:       i32,
  pub end_year:         i32,
  pub overall_progress: f64,
  pub created_at:       String,
}

impl RawCycle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cycle_id:         row.get(0)?,
      program_id:       row.get(1)?,
      start_year:       row.get(2)?,
      end_year:         row.get(3)?,
      overall_progress: row.get(4)?,
      created_at:       row.get(5)?,
    })
  }

  pub fn into_cycle(self) -> Result<Cycle> {
    Ok(Cycle {
      cycle_id:                    self.cycle_id,
      program_id:                  self.program_id,
      start_year:                  self.start_year,
      end_year:                    self.end_year,
      overall_progress_percentage: self.overall_progress,
      created_at:                  decode_dt(&self.created_at)?,
    })
  }
}

pub const ITEM_COLUMNS: &str =
  "item_id, cycle_id, slot, item_name, status, completion_percentage, record_id";

/// A `checklist_items` row as read from SQLite.
pub struct RawChecklistItem {
  pub item_id:    i64,
  pub cycle_id:   i64,
  pub slot:       String,
  pub item_name:  String,
  pub status:     i32,
  pub completion: f64,
  pub record_id:  Option<i64>,
}

impl RawChecklistItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:    row.get(0)?,
      cycle_id:   row.get(1)?,
      slot:       row.get(2)?,
      item_name:  row.get(3)?,
      status:     row.get(4)?,
      completion: row.get(5)?,
      record_id:  row.get(6)?,
    })
  }

  pub fn into_item(self) -> Result<ChecklistItem> {
    Ok(ChecklistItem {
      item_id:               self.item_id,
      cycle_id:              self.cycle_id,
      slot:                  decode_slot(&self.slot)?,
      item_name:             self.item_name,
      status:                self.status,
      completion_percentage: self.completion,
      record_id:             self.record_id,
    })
  }
}

pub const RECORD_COLUMNS: &str =
  "record_id, cycle_id, section, fields_json, completion_percentage, updated_at";

/// A `section_records` row as read from SQLite.
pub struct RawSectionRecord {
  pub record_id:   i64,
  pub cycle_id:    i64,
  pub section:     String,
  pub fields_json: String,
  pub completion:  f64,
  pub updated_at:  String,
}

impl RawSectionRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:   row.get(0)?,
      cycle_id:    row.get(1)?,
      section:     row.get(2)?,
      fields_json: row.get(3)?,
      completion:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<SectionRecord> {
    let section = decode_section(&self.section)?;
    let data: serde_json::Value = serde_json::from_str(&self.fields_json)?;
    Ok(SectionRecord {
      record_id:             self.record_id,
      cycle_id:              self.cycle_id,
      fields:                SectionFields::from_parts(section, data)?,
      completion_percentage: self.completion,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// A `section_rows` row as read from SQLite.
pub struct RawSectionRow {
  pub row_id:     i64,
  pub collection: String,
  pub position:   i64,
  pub data_json:  String,
}

impl RawSectionRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      row_id:     row.get(0)?,
      collection: row.get(1)?,
      position:   row.get(2)?,
      data_json:  row.get(3)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredRow> {
    let collection = decode_collection(&self.collection)?;
    let data: serde_json::Value = serde_json::from_str(&self.data_json)?;
    Ok(StoredRow {
      row_id:   self.row_id,
      position: self.position,
      row:      SectionRow::from_parts(collection, data)?,
    })
  }
}

pub const EVIDENCE_COLUMNS: &str =
  "evidence_id, cycle_id, user_id, file_name, file_type, upload_date";

/// An `evidence_files` row as read from SQLite.
pub struct RawEvidence {
  pub evidence_id: i64,
  pub cycle_id:    i64,
  pub user_id:     i64,
  pub file_name:   String,
  pub file_type:   String,
  pub upload_date: String,
}

impl RawEvidence {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      evidence_id: row.get(0)?,
      cycle_id:    row.get(1)?,
      user_id:     row.get(2)?,
      file_name:   row.get(3)?,
      file_type:   row.get(4)?,
      upload_date: row.get(5)?,
    })
  }

  pub fn into_evidence(self) -> Result<EvidenceFile> {
    Ok(EvidenceFile {
      evidence_id: self.evidence_id,
      cycle_id:    self.cycle_id,
      user_id:     self.user_id,
      file_name:   self.file_name,
      file_type:   self.file_type,
      upload_date: decode_date(&self.upload_date)?,
    })
  }
}
