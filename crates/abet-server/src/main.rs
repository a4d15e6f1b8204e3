//! abet-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API under `/api`.
//!
//! # Bootstrapping an administrator
//!
//! ```
//! cargo run -p abet-server -- --create-admin dean@example.edu
//! ```
//!
//! prompts for a password on stdin, stores its argon2 hash and exits.

mod config;

use std::{path::PathBuf, sync::Arc};

use abet_api::{AppState, AuthConfig};
use abet_core::store::AccreditationStore as _;
use abet_store_sqlite::SqliteStore;
use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "ABET accreditation records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create or reset an administrator account with a password read from
  /// stdin, then exit.
  #[arg(long, value_name = "EMAIL")]
  create_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: bootstrap an administrator and exit.
  if let Some(email) = cli.create_admin {
    let password = read_password()?;
    if password.is_empty() {
      anyhow::bail!("password must not be empty");
    }
    let hash = abet_api::auth::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    let user = store
      .upsert_user(email, hash, server_cfg.admin_role.clone())
      .await
      .context("failed to store administrator")?;
    tracing::info!(user_id = user.user_id, email = %user.email, "administrator ready");
    return Ok(());
  }

  let state = AppState {
    store: Arc::new(store),
    auth:  Arc::new(AuthConfig {
      jwt_secret:  server_cfg.jwt_secret.clone(),
      access_ttl:  chrono::Duration::minutes(server_cfg.access_token_minutes),
      refresh_ttl: chrono::Duration::days(server_cfg.refresh_token_days),
      admin_role:  server_cfg.admin_role.clone(),
    }),
  };

  let app = Router::new().nest("/api", abet_api::api_router(state));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(store = ?store_path, "Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
