//! User accounts and roles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAccount {
  pub user_id:       i64,
  pub email:         String,
  /// Argon2 PHC string, or a legacy plaintext value awaiting upgrade.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role_name:     String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// Whether a stored hash is a PHC-format argon2 string rather than a legacy
/// plaintext password.
pub fn is_phc_hash(stored: &str) -> bool { stored.starts_with("$argon2") }
