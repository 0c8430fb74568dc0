//! The uniform envelope returned by the remote client and stored in the cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status, headers and (already inflated) body of one remote GET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResponse {
  pub status:  u16,
  /// Lower-cased header names. Repeated headers are joined with `, `; values
  /// that are not valid UTF-8 are dropped.
  pub headers: BTreeMap<String, String>,
  pub body:    Vec<u8>,
}

impl RemoteResponse {
  pub fn is_ok(&self) -> bool { self.status == 200 }

  /// A body consisting only of whitespace counts as empty.
  pub fn is_empty(&self) -> bool {
    self.body.iter().all(u8::is_ascii_whitespace)
  }
}
