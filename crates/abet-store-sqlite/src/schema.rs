//! SQL schema for the accreditation SQLite store.
//!
//! Executed once at connection startup and versioned via
//! `PRAGMA user_version`. Future migrations will be gated on that version
//! number.
//!
//! Data owned wholly by one parent cascades through foreign keys. Syllabus
//! sections and their shared lookup rows never cascade: they are removed by
//! the explicit section delete so shared rows survive while still referenced.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Accounts ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS roles (
    role_id   INTEGER PRIMARY KEY,
    role_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,          -- argon2 PHC string or legacy plaintext
    role_id       INTEGER NOT NULL REFERENCES roles(role_id)
);

-- ── Programs and cycles ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS programs (
    program_id    INTEGER PRIMARY KEY,
    program_name  TEXT NOT NULL UNIQUE COLLATE NOCASE,
    program_level TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cycles (
    cycle_id                    INTEGER PRIMARY KEY,
    program_id                  INTEGER NOT NULL
                                REFERENCES programs(program_id) ON DELETE CASCADE,
    start_year                  INTEGER NOT NULL,
    end_year                    INTEGER NOT NULL,
    overall_progress_percentage REAL NOT NULL DEFAULT 0,
    created_at                  TEXT NOT NULL   -- RFC 3339 UTC
);

-- ── Section records ─────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS section_records (
    record_id             INTEGER PRIMARY KEY,
    cycle_id              INTEGER NOT NULL
                          REFERENCES cycles(cycle_id) ON DELETE CASCADE,
    section               TEXT NOT NULL,    -- 'background' | 'criterion1' | ... | 'appendixd'
    fields_json           TEXT NOT NULL,    -- narrative fields (inner payload only)
    completion_percentage REAL NOT NULL DEFAULT 0,
    updated_at            TEXT NOT NULL,
    UNIQUE (cycle_id, section)
);

CREATE TABLE IF NOT EXISTS section_rows (
    row_id     INTEGER PRIMARY KEY,
    record_id  INTEGER NOT NULL
               REFERENCES section_records(record_id) ON DELETE CASCADE,
    collection TEXT NOT NULL,               -- e.g. 'classrooms', 'table_5_1_rows'
    position   INTEGER NOT NULL,
    data_json  TEXT NOT NULL
);

-- Each cycle owns exactly one checklist: the set of its items.
CREATE TABLE IF NOT EXISTS checklist_items (
    item_id               INTEGER PRIMARY KEY,
    cycle_id              INTEGER NOT NULL
                          REFERENCES cycles(cycle_id) ON DELETE CASCADE,
    slot                  TEXT NOT NULL,    -- CriterionSlot tag
    item_name             TEXT NOT NULL,
    status                INTEGER NOT NULL DEFAULT 0,
    completion_percentage REAL NOT NULL DEFAULT 0,
    record_id             INTEGER
                          REFERENCES section_records(record_id) ON DELETE SET NULL
);

-- ── Faculty ─────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS faculty_members (
    faculty_id       INTEGER PRIMARY KEY,
    full_name        TEXT NOT NULL,
    academic_rank    TEXT NOT NULL DEFAULT '',
    appointment_type TEXT NOT NULL DEFAULT '',
    email            TEXT NOT NULL UNIQUE COLLATE NOCASE,
    phone            TEXT NOT NULL DEFAULT '',
    office_hours     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS faculty_program_assignments (
    faculty_id INTEGER NOT NULL
               REFERENCES faculty_members(faculty_id) ON DELETE CASCADE,
    program_id INTEGER NOT NULL
               REFERENCES programs(program_id) ON DELETE CASCADE,
    PRIMARY KEY (faculty_id, program_id)
);

CREATE TABLE IF NOT EXISTS faculty_rows (
    row_id     INTEGER PRIMARY KEY,
    faculty_id INTEGER NOT NULL
               REFERENCES faculty_members(faculty_id) ON DELETE CASCADE,
    collection TEXT NOT NULL,               -- 'qualifications' | 'publications' | ...
    position   INTEGER NOT NULL,
    data_json  TEXT NOT NULL
);

-- ── Courses and syllabi ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS unified_syllabi (
    unified_syllabus_id INTEGER PRIMARY KEY,
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS syllabus_descriptions (
    description_id      INTEGER PRIMARY KEY,
    catalog_description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS syllabus_outlines (
    outline_id    INTEGER PRIMARY KEY,
    weekly_topics TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS syllabus_additional_info (
    additional_info_id          INTEGER PRIMARY KEY,
    design_content_percentage   REAL NOT NULL DEFAULT 0,
    software_or_labs_tools_used TEXT NOT NULL DEFAULT ''
);

-- Courses are deleted explicitly so their sections go through the
-- cascading section delete first.
CREATE TABLE IF NOT EXISTS courses (
    course_id           INTEGER PRIMARY KEY,
    cycle_id            INTEGER NOT NULL REFERENCES cycles(cycle_id),
    course_code         TEXT NOT NULL,      -- normalised: trimmed, single-spaced, upper-case
    course_title        TEXT NOT NULL DEFAULT '',
    credits             REAL NOT NULL DEFAULT 0,
    contact_hours       REAL NOT NULL DEFAULT 0,
    course_type         TEXT NOT NULL DEFAULT 'Required',
    unified_syllabus_id INTEGER
                        REFERENCES unified_syllabi(unified_syllabus_id) ON DELETE SET NULL,
    UNIQUE (cycle_id, course_code)
);

CREATE TABLE IF NOT EXISTS instructor_syllabi (
    section_id          INTEGER PRIMARY KEY,
    course_id           INTEGER NOT NULL REFERENCES courses(course_id),
    faculty_id          INTEGER NOT NULL REFERENCES faculty_members(faculty_id),
    term                TEXT NOT NULL,
    unified_syllabus_id INTEGER NOT NULL REFERENCES unified_syllabi(unified_syllabus_id),
    description_id      INTEGER NOT NULL REFERENCES syllabus_descriptions(description_id),
    outline_id          INTEGER NOT NULL REFERENCES syllabus_outlines(outline_id),
    additional_info_id  INTEGER NOT NULL REFERENCES syllabus_additional_info(additional_info_id),
    UNIQUE (course_id, faculty_id)
);

CREATE TABLE IF NOT EXISTS syllabus_assessments (
    section_id        INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    position          INTEGER NOT NULL,
    assessment_type   TEXT NOT NULL,
    weight_percentage REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS syllabus_supplements (
    section_id           INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    position             INTEGER NOT NULL,
    material_description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS syllabus_textbooks (
    section_id        INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    position          INTEGER NOT NULL,
    title_author_year TEXT NOT NULL,
    attribute         TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS syllabus_prerequisites (
    section_id  INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    position    INTEGER NOT NULL,
    course_code TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS syllabus_corequisites (
    section_id  INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    position    INTEGER NOT NULL,
    course_code TEXT NOT NULL
);

-- ── Outcomes and mappings ───────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS student_outcomes (
    so_id       INTEGER PRIMARY KEY,
    program_id  INTEGER NOT NULL REFERENCES programs(program_id) ON DELETE CASCADE,
    code        TEXT NOT NULL,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS peos (
    peo_id      INTEGER PRIMARY KEY,
    program_id  INTEGER NOT NULL REFERENCES programs(program_id) ON DELETE CASCADE,
    code        TEXT NOT NULL,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS course_learning_outcomes (
    clo_id      INTEGER PRIMARY KEY,
    course_id   INTEGER NOT NULL REFERENCES courses(course_id) ON DELETE CASCADE,
    code        TEXT NOT NULL,
    description TEXT NOT NULL
);

-- SO \"supports\" PEO.
CREATE TABLE IF NOT EXISTS so_peo_mappings (
    so_id  INTEGER NOT NULL REFERENCES student_outcomes(so_id) ON DELETE CASCADE,
    peo_id INTEGER NOT NULL REFERENCES peos(peo_id) ON DELETE CASCADE,
    PRIMARY KEY (so_id, peo_id)
);

-- CLO \"maps to\" SO.
CREATE TABLE IF NOT EXISTS clo_so_mappings (
    clo_id INTEGER NOT NULL REFERENCES course_learning_outcomes(clo_id) ON DELETE CASCADE,
    so_id  INTEGER NOT NULL REFERENCES student_outcomes(so_id) ON DELETE CASCADE,
    PRIMARY KEY (clo_id, so_id)
);

-- Per-section overrides: a CLO mapped to an SO for this section only.
CREATE TABLE IF NOT EXISTS syllabus_clo_so_mappings (
    section_id INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    clo_id     INTEGER NOT NULL REFERENCES course_learning_outcomes(clo_id) ON DELETE CASCADE,
    so_id      INTEGER NOT NULL REFERENCES student_outcomes(so_id) ON DELETE CASCADE,
    UNIQUE (section_id, clo_id, so_id)
);

-- CLOs assigned to a section without an SO mapping.
CREATE TABLE IF NOT EXISTS syllabus_clo_assignments (
    section_id INTEGER NOT NULL REFERENCES instructor_syllabi(section_id),
    clo_id     INTEGER NOT NULL REFERENCES course_learning_outcomes(clo_id) ON DELETE CASCADE,
    UNIQUE (section_id, clo_id)
);

-- ── Evidence ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS evidence_files (
    evidence_id INTEGER PRIMARY KEY,
    cycle_id    INTEGER NOT NULL REFERENCES cycles(cycle_id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    file_name   TEXT NOT NULL,
    file_type   TEXT NOT NULL,
    upload_date TEXT NOT NULL          -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS checklist_items_cycle_idx ON checklist_items(cycle_id);
CREATE INDEX IF NOT EXISTS section_rows_record_idx   ON section_rows(record_id, collection);
CREATE INDEX IF NOT EXISTS courses_cycle_idx         ON courses(cycle_id);
CREATE INDEX IF NOT EXISTS sections_course_idx       ON instructor_syllabi(course_id);
CREATE INDEX IF NOT EXISTS faculty_rows_member_idx   ON faculty_rows(faculty_id);
CREATE INDEX IF NOT EXISTS evidence_cycle_idx        ON evidence_files(cycle_id);

PRAGMA user_version = 1;
";
