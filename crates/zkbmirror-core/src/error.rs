//! Error types for `zkbmirror-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("kill {kill_id} has no ship type")]
  MissingShipType { kill_id: i64 },

  #[error("unrecognised kill time: {0:?}")]
  KillTime(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
