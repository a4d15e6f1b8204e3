//! Bearer-token authentication: login, refresh, and the request guard.
//!
//! Tokens are HS256 JWTs. An access token authorises API calls; a refresh
//! token only buys a new access token. Only accounts holding the configured
//! administrative role may sign in.

use abet_core::{
  account::{Credentials, UserAccount, is_phc_hash},
  store::AccreditationStore,
};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Request, State},
  http::header,
  middleware::Next,
  response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::Body};

/// Token settings for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub jwt_secret:  String,
  pub access_ttl:  Duration,
  pub refresh_ttl: Duration,
  /// Role name an account must hold to sign in.
  pub admin_role:  String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// The user id.
  pub sub:  String,
  pub role: String,
  pub kind: TokenKind,
  pub jti:  String,
  pub iat:  i64,
  pub exp:  i64,
}

/// The authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user_id:   i64,
  pub role_name: String,
}

fn invalid_token() -> ApiError {
  ApiError::Unauthorized("Token is invalid or expired".into())
}

impl AuthConfig {
  pub fn issue(&self, user: &UserAccount, kind: TokenKind) -> Result<String, ApiError> {
    let now = Utc::now();
    let ttl = match kind {
      TokenKind::Access => self.access_ttl,
      TokenKind::Refresh => self.refresh_ttl,
    };
    let claims = Claims {
      sub: user.user_id.to_string(),
      role: user.role_name.clone(),
      kind,
      jti: Uuid::new_v4().to_string(),
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };
    encode(
      &Header::default(),
      &claims,
      &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))
  }

  /// Decode `token`, checking signature, expiry and kind.
  pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
      &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| invalid_token())?;
    if data.claims.kind != kind {
      return Err(invalid_token());
    }
    Ok(data.claims)
  }
}

// ─── Passwords ────────────────────────────────────────────────────────────────

/// Argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Compare against a PHC hash, or verbatim against a legacy plaintext value.
fn password_matches(stored: &str, password: &str) -> bool {
  if !is_phc_hash(stored) {
    return stored == password;
  }
  let Ok(parsed) = PasswordHash::new(stored) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TokenPair {
  pub access:  String,
  pub refresh: String,
}

/// `POST /auth/login`: body: `{"email": "...", "password": "..."}`
pub async fn login<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Body(creds): Body<Credentials>,
) -> Result<Json<TokenPair>, ApiError> {
  let rejected =
    || ApiError::Unauthorized("No active account found with the given credentials".into());

  let email = creds.email.trim().to_lowercase();
  let Some(user) = state
    .store
    .find_user_by_email(email.clone())
    .await
    .map_err(ApiError::store)?
  else {
    tracing::warn!(%email, "login rejected: unknown account");
    return Err(rejected());
  };

  let stored = user.password_hash.clone();
  let password = creds.password.clone();
  let matches = tokio::task::spawn_blocking(move || password_matches(&stored, &password))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  if !matches {
    tracing::warn!(user_id = user.user_id, "login rejected: wrong password");
    return Err(rejected());
  }

  if user.role_name != state.auth.admin_role {
    tracing::warn!(user_id = user.user_id, role = %user.role_name, "login rejected: role");
    return Err(ApiError::Forbidden("Only administrators can sign in.".into()));
  }

  if !is_phc_hash(&user.password_hash) {
    let password = creds.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
      .await
      .map_err(|e| ApiError::Internal(e.to_string()))?
      .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))?;
    state
      .store
      .set_password_hash(user.user_id, hash)
      .await
      .map_err(ApiError::store)?;
    tracing::warn!(user_id = user.user_id, "upgraded legacy plaintext password");
  }

  Ok(Json(TokenPair {
    access:  state.auth.issue(&user, TokenKind::Access)?,
    refresh: state.auth.issue(&user, TokenKind::Refresh)?,
  }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
  pub access: String,
}

/// `POST /auth/refresh`: body: `{"refresh": "..."}`
pub async fn refresh<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  Body(body): Body<RefreshBody>,
) -> Result<Json<AccessToken>, ApiError> {
  let claims = state.auth.verify(&body.refresh, TokenKind::Refresh)?;
  let user_id: i64 = claims.sub.parse().map_err(|_| invalid_token())?;
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(invalid_token)?;
  if user.role_name != state.auth.admin_role {
    return Err(ApiError::Forbidden("Only administrators can sign in.".into()));
  }
  Ok(Json(AccessToken { access: state.auth.issue(&user, TokenKind::Access)? }))
}

// ─── Guard ────────────────────────────────────────────────────────────────────

/// Middleware requiring `Authorization: Bearer <access token>`.
pub async fn require_auth<S: AccreditationStore + 'static>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or_else(|| {
      ApiError::Unauthorized("Authentication credentials were not provided.".into())
    })?;

  let claims = state.auth.verify(token, TokenKind::Access)?;
  let user_id = claims.sub.parse().map_err(|_| invalid_token())?;
  req.extensions_mut().insert(CurrentUser { user_id, role_name: claims.role });
  Ok(next.run(req).await)
}
