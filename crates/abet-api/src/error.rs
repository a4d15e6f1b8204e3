//! API error type and [`axum::response::IntoResponse`] implementation.

use abet_core::FieldErrors;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// Every field problem found in the request; nothing was written.
  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    ApiError::Store(Box::new(e))
  }

  pub fn not_found(what: &str, id: i64) -> Self {
    ApiError::NotFound(format!("{what} {id} not found"))
  }
}

impl From<FieldErrors> for ApiError {
  fn from(errors: FieldErrors) -> Self { ApiError::Validation(errors) }
}

impl From<abet_core::Error> for ApiError {
  fn from(e: abet_core::Error) -> Self { ApiError::Internal(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Validation(errors) => {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, m)
      }
    };
    (status, Json(json!({ "detail": message }))).into_response()
  }
}

/// Reject the request when `errors` holds anything.
pub fn reject(errors: FieldErrors) -> Result<(), ApiError> {
  errors.into_result().map_err(ApiError::Validation)
}
