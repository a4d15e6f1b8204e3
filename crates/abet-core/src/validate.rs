//! Field validation helpers shared by every structured-input endpoint.
//!
//! Validators never stop at the first problem. Each one pushes its messages
//! into a [`FieldErrors`] map keyed by field path, and the caller rejects the
//! whole request while the map is non-empty. Nothing is written in that case.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

// ─── Error map ───────────────────────────────────────────────────────────────

/// Per-field validation messages, serialised as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  /// A map holding a single message.
  pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.0.entry(field.into()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn merge(&mut self, other: FieldErrors) {
    for (field, messages) in other.0 {
      self.0.entry(field).or_default().extend(messages);
    }
  }

  /// `Ok(())` when empty, otherwise `Err(self)`.
  pub fn into_result(self) -> Result<(), FieldErrors> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }

  /// Re-key every entry under `prefix` (`email` → `member.email`).
  pub fn prefixed(self, prefix: &str) -> Self {
    if prefix.is_empty() {
      return self;
    }
    Self(self.0.into_iter().map(|(k, v)| (format!("{prefix}{k}"), v)).collect())
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{field}: {message}")?;
        first = false;
      }
    }
    Ok(())
  }
}

impl std::error::Error for FieldErrors {}

/// Key for problems that belong to the body as a whole.
pub const NON_FIELD: &str = "non_field_errors";

/// Deserialise a request body. A type error is reported under the path of the
/// offending field (`credits`, `mappings[1].so_id`); a missing field under
/// its own name.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FieldErrors> {
  serde_path_to_error::deserialize(value).map_err(|e| {
    let path = e.path().to_string();
    let message = e.into_inner().to_string();
    if let Some(name) = message.strip_prefix("missing field `").and_then(|m| m.strip_suffix('`')) {
      let key = if path == "." { name.to_string() } else { format!("{path}.{name}") };
      return FieldErrors::single(key, MSG_REQUIRED);
    }
    let key = if path == "." { NON_FIELD.to_string() } else { path };
    FieldErrors::single(key, message)
  })
}

/// Build a nested field path such as `equipment_rows[2].quantity`.
pub fn row_field(collection: &str, index: usize, field: &str) -> String {
  format!("{collection}[{index}].{field}")
}

// ─── Messages ────────────────────────────────────────────────────────────────

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_YEAR_DIGITS: &str = "Year must be exactly 4 digits.";
pub const MSG_YEAR_FUTURE: &str = "Year cannot be in the future.";
pub const MSG_PHONE_DIGITS: &str =
  "Phone number must contain digits only (optional leading +).";
pub const MSG_DATE_FORMAT: &str =
  "Enter a valid date (YYYY-MM-DD, YYYY/MM/DD or MM/DD/YYYY).";
pub const MSG_DATE_FUTURE: &str = "Date cannot be in the future.";
pub const MSG_REVIEW_YEAR: &str =
  "Last general review must be before the current year.";
pub const MSG_EMAIL: &str = "Enter a valid email address.";
pub const MSG_PERCENT: &str = "Must be between 0 and 100.";
pub const MSG_NON_NEGATIVE: &str = "Must be zero or greater.";

// ─── Scalars ─────────────────────────────────────────────────────────────────

/// Accepted input date formats, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// How a date field relates to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
  /// Any valid calendar date (e.g. a scheduled upgrade).
  Any,
  NotFuture,
  /// Strictly before January 1st of the current year.
  BeforeCurrentYear,
}

pub fn is_blank(raw: &str) -> bool { raw.trim().is_empty() }

pub fn required(errors: &mut FieldErrors, field: &str, raw: &str) {
  if is_blank(raw) {
    errors.add(field, MSG_REQUIRED);
  }
}

/// Exactly four ASCII digits; no relation to today.
pub fn year_format(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<i32> {
  let trimmed = raw.trim();
  if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    errors.add(field, MSG_YEAR_DIGITS);
    return None;
  }
  trimmed.parse().ok()
}

/// Exactly four digits and not after the current year.
pub fn year(
  errors: &mut FieldErrors,
  field: &str,
  raw: &str,
  today: NaiveDate,
) -> Option<i32> {
  let year = year_format(errors, field, raw)?;
  if year > today.year() {
    errors.add(field, MSG_YEAR_FUTURE);
    return None;
  }
  Some(year)
}

/// Strip spaces, hyphens, dots and parentheses, then require digits with an
/// optional leading `+`. Returns the normalised number.
pub fn phone(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<String> {
  let stripped: String = raw
    .chars()
    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
    .collect();
  let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    errors.add(field, MSG_PHONE_DIGITS);
    return None;
  }
  Some(stripped)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn date(
  errors: &mut FieldErrors,
  field: &str,
  raw: &str,
  today: NaiveDate,
  rule: DateRule,
) -> Option<NaiveDate> {
  let Some(parsed) = parse_date(raw) else {
    errors.add(field, MSG_DATE_FORMAT);
    return None;
  };
  match rule {
    DateRule::Any => {}
    DateRule::NotFuture if parsed > today => {
      errors.add(field, MSG_DATE_FUTURE);
      return None;
    }
    DateRule::BeforeCurrentYear if parsed.year() >= today.year() => {
      errors.add(field, MSG_REVIEW_YEAR);
      return None;
    }
    _ => {}
  }
  Some(parsed)
}

/// Validate an optional date held as text, rewriting it to ISO form.
/// Blank input becomes `None`.
pub fn normalize_date(
  errors: &mut FieldErrors,
  field: &str,
  value: &mut Option<String>,
  today: NaiveDate,
  rule: DateRule,
) {
  let Some(raw) = value.as_deref() else { return };
  if is_blank(raw) {
    *value = None;
    return;
  }
  if let Some(parsed) = date(errors, field, raw, today, rule) {
    *value = Some(parsed.format("%Y-%m-%d").to_string());
  }
}

/// Validate an optional phone number held as text, rewriting it normalised.
pub fn normalize_phone(errors: &mut FieldErrors, field: &str, value: &mut String) {
  if is_blank(value) {
    value.clear();
    return;
  }
  if let Some(normalized) = phone(errors, field, value) {
    *value = normalized;
  }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern")
});

pub fn email(errors: &mut FieldErrors, field: &str, raw: &str) -> bool {
  if EMAIL_RE.is_match(raw.trim()) {
    true
  } else {
    errors.add(field, MSG_EMAIL);
    false
  }
}

pub fn percentage(errors: &mut FieldErrors, field: &str, value: f64) {
  if !(0.0..=100.0).contains(&value) {
    errors.add(field, MSG_PERCENT);
  }
}

pub fn non_negative(errors: &mut FieldErrors, field: &str, value: f64) {
  if value < 0.0 {
    errors.add(field, MSG_NON_NEGATIVE);
  }
}
