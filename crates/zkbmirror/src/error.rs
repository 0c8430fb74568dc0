//! Error type for a sync run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("client error: {0}")]
  Client(#[from] zkbmirror_client::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("reference data error: {0}")]
  Reference(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("kill {kill_id}: unknown solar system {solar_system_id}")]
  UnknownSolarSystem { kill_id: i64, solar_system_id: i64 },

  #[error("solar system {solar_system_id}: unknown region {region_id}")]
  UnknownRegion { solar_system_id: i64, region_id: i64 },

  #[error("malformed kill: {0}")]
  Decode(#[from] zkbmirror_core::Error),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
