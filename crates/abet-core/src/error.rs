//! Error types for `abet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown section tag: {0:?}")]
  UnknownSection(String),

  #[error("unknown row collection: {0:?}")]
  UnknownCollection(String),

  #[error("unknown checklist slot: {0:?}")]
  UnknownSlot(String),

  #[error("unknown faculty record collection: {0:?}")]
  UnknownFacultyCollection(String),

  #[error("invalid payload: {0}")]
  InvalidPayload(#[from] crate::FieldErrors),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
