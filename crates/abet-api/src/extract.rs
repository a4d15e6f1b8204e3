//! JSON body extractor speaking the API's error contract.

use abet_core::validate;
use axum::{
  Json,
  extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Drop-in for [`axum::Json`] on the request side. A body that is not JSON
/// is a 400 `{"detail"}`; a field of the wrong type or a missing required
/// field is a 400 field map keyed by the field's path.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<Value>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Body(validate::decode(value)?))
  }
}
