//! SQLite backends for the zkbmirror killboard mirror.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Three independent handles are offered:
//! the kill store, the read-only reference data, and the response cache.

mod cache;
mod encode;
mod reference;
mod schema;
mod store;

pub mod error;

pub use cache::SqliteCache;
pub use error::{Error, Result};
pub use reference::SqliteReference;
pub use schema::REFERENCE_SCHEMA;
pub use store::SqliteStore;

use std::path::{Path, PathBuf};

/// Accept both bare paths and `sqlite://` connection strings.
pub fn sqlite_path(location: &str) -> PathBuf {
  let trimmed = location.strip_prefix("sqlite://").unwrap_or(location);
  Path::new(trimmed).to_path_buf()
}
