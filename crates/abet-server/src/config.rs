//! Runtime configuration: an optional TOML file layered under `ABET_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// HMAC secret for access and refresh tokens. Required.
  pub jwt_secret:           String,
  #[serde(default = "default_access_minutes")]
  pub access_token_minutes: i64,
  #[serde(default = "default_refresh_days")]
  pub refresh_token_days:   i64,
  /// Role an account must hold to sign in.
  #[serde(default = "default_admin_role")]
  pub admin_role:           String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/abet/abet.db") }
fn default_access_minutes() -> i64 { 60 }
fn default_refresh_days() -> i64 { 7 }
fn default_admin_role() -> String { "admin".to_string() }

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ABET"))
      .build()
      .context("failed to read config file")?;
    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig (is jwt_secret set?)")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn everything_but_the_secret_has_a_default() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("jwt_secret", "s")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.access_token_minutes, 60);
    assert_eq!(cfg.admin_role, "admin");

    let missing = config::Config::builder().build().unwrap().try_deserialize::<ServerConfig>();
    assert!(missing.is_err());
  }

  #[test]
  fn only_leading_tilde_expands() {
    assert_eq!(expand_tilde(Path::new("/var/abet.db")), PathBuf::from("/var/abet.db"));
    assert_eq!(expand_tilde(Path::new("db/~/x")), PathBuf::from("db/~/x"));
  }
}
