//! Ordered request parameters.
//!
//! The killboard takes its parameters as `key/value/` path segments. The URL
//! is also the cache key, so the same logical query must always be built in
//! the same order: pairs are kept exactly as pushed.

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pairs: Vec<(String, String)>,
}

impl QueryParams {
  pub fn new() -> Self { Self::default() }

  /// Append a pair, builder style.
  pub fn with(mut self, key: &str, value: impl Display) -> Self {
    self.push(key, value);
    self
  }

  pub fn push(&mut self, key: &str, value: impl Display) {
    self.pairs.push((key.to_owned(), value.to_string()));
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

  /// `key/value/key/value`, without leading or trailing slash.
  pub fn path(&self) -> String {
    self
      .iter()
      .flat_map(|(k, v)| [k, v])
      .collect::<Vec<_>>()
      .join("/")
  }
}
