//! Betterpedia discussion server: configuration and router assembly.
//!
//! The binary in `main.rs` only parses flags, loads [`ServerConfig`], opens
//! the store and hands it to [`app`].

use std::path::{Path, PathBuf};

use axum::Router;
use betterpedia_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BETTERPEDIA_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite file holding comments and badges. A leading `~/` is expanded.
  pub store_path: PathBuf,
  /// Path under which the API router is mounted.
  pub api_prefix: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("betterpedia.db"),
      api_prefix: "/api".to_string(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Mount the API for `store` under `config.api_prefix` and wrap it in
/// request tracing.
pub fn app(store: SqliteStore, config: &ServerConfig) -> Router {
  let api = betterpedia_api::api_router(store);
  let prefix = config.api_prefix.trim_end_matches('/');

  // axum refuses to nest at the root.
  let router = if prefix.is_empty() {
    Router::new().merge(api)
  } else {
    Router::new().nest(prefix, api)
  };

  router.layer(TraceLayer::new_for_http())
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
