//! Error type for `zkbmirror-client`.

use thiserror::Error;
use zkbmirror_core::cache::CacheFailure;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid header value for {name}: {value:?}")]
  InvalidHeader { name: &'static str, value: String },

  #[error(transparent)]
  Cache(#[from] CacheFailure),
}

impl Error {
  /// Whether the failure came from the network rather than local state.
  ///
  /// Transient failures end the current region's pagination; anything else
  /// aborts the run.
  pub fn is_transient(&self) -> bool { matches!(self, Self::Http(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
