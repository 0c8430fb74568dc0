//! Runtime configuration.
//!
//! Read from an optional TOML file and overridden by `ZKBMIRROR_*`
//! environment variables, e.g. `ZKBMIRROR_PAST_SECONDS=3600`.

use std::{path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use zkbmirror_client::DEFAULT_BASE_URL;

/// The killboard only accepts whole hours, up to one week.
const PAST_SECONDS_STEP: u32 = 3600;
const PAST_SECONDS_MAX: u32 = 7 * 24 * 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("reference_database is not set; the static data export must be configured explicitly")]
  MissingReferenceDatabase,

  #[error("past_seconds must be a positive multiple of 3600 up to 604800, got {0}")]
  PastSeconds(u32),
}

/// Shape of the configuration sources, before validation.
#[derive(Deserialize)]
struct RawSettings {
  #[serde(default)]
  debug:                bool,
  #[serde(default = "default_past_seconds")]
  past_seconds:         u32,
  #[serde(default = "default_database")]
  database:             String,
  reference_database:   Option<String>,
  #[serde(default = "default_cache_database")]
  cache_database:       String,
  #[serde(default = "default_cache_ttl_secs")]
  cache_ttl_secs:       u64,
  #[serde(default = "default_base_url")]
  base_url:             String,
  #[serde(default = "default_user_agent")]
  user_agent:           String,
  #[serde(default = "default_request_timeout_secs")]
  request_timeout_secs: u64,
}

fn default_past_seconds() -> u32 { 86_400 }
fn default_database() -> String { "kills.db".to_owned() }
fn default_cache_database() -> String { "zkb-cache.db".to_owned() }
fn default_cache_ttl_secs() -> u64 { 3600 }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_user_agent() -> String { format!("zkbmirror/{}", env!("CARGO_PKG_VERSION")) }
fn default_request_timeout_secs() -> u64 { 30 }

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Settings {
  /// Lower the default log filter to `debug`, which includes per-request
  /// logging.
  pub debug:              bool,
  /// How far back the killboard is asked to search.
  pub past_seconds:       u32,
  /// Kill store location; a path or `sqlite://` string.
  pub database:           String,
  /// Static data export location; never defaulted to `database`.
  pub reference_database: String,
  pub cache_database:     String,
  pub cache_ttl:          Duration,
  pub base_url:           String,
  pub user_agent:         String,
  pub request_timeout:    Duration,
}

impl Settings {
  /// Load from `file` (if it exists) and the environment.
  pub fn load(file: &Path) -> Result<Self, ConfigError> {
    let cfg = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("ZKBMIRROR"))
      .build()?;
    Self::from_config(cfg)
  }

  /// Deserialise and validate an already-built configuration.
  pub fn from_config(cfg: config::Config) -> Result<Self, ConfigError> {
    let raw: RawSettings = cfg.try_deserialize()?;

    if raw.past_seconds == 0
      || raw.past_seconds % PAST_SECONDS_STEP != 0
      || raw.past_seconds > PAST_SECONDS_MAX
    {
      return Err(ConfigError::PastSeconds(raw.past_seconds));
    }

    let reference_database = raw
      .reference_database
      .filter(|s| !s.trim().is_empty())
      .ok_or(ConfigError::MissingReferenceDatabase)?;

    Ok(Self {
      debug: raw.debug,
      past_seconds: raw.past_seconds,
      database: raw.database,
      reference_database,
      cache_database: raw.cache_database,
      cache_ttl: Duration::from_secs(raw.cache_ttl_secs),
      base_url: raw.base_url,
      user_agent: raw.user_agent,
      request_timeout: Duration::from_secs(raw.request_timeout_secs),
    })
  }
}
