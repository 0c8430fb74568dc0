//! Incremental mirror of zKillboard structure kills.
//!
//! [`SyncEngine`] walks every region known to the reference data, pages
//! through the killboard for each one, and records kills it has not seen
//! before. A run is a single sequential pass; scheduling is left to the
//! caller (cron, a systemd timer, ...).

pub mod engine;
pub mod error;
pub mod settings;

pub use engine::{INTERESTING_SHIP_TYPES, PAGE_SIZE, SyncEngine, SyncSummary};
pub use error::{Result, SyncError};
pub use settings::{ConfigError, Settings};

#[cfg(test)]
mod tests;
