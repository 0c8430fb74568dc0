//! The `KillStore` trait.
//!
//! Implemented by storage backends (e.g. `zkbmirror-store-sqlite`). The sync
//! engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::kill::{AttackerRecord, KillRecord, NewKill};

/// Result of [`KillStore::record_kill`]. Errors travel in the outer `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  /// The kill and all of its attackers were written.
  Inserted,
  /// A kill with the same id already exists; nothing was written.
  AlreadyPresent,
}

/// Abstraction over the mirror's persistent store.
///
/// Kills are append-only: once recorded, a kill and its attackers are never
/// updated or deleted.
pub trait KillStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Atomically insert a kill and its attackers unless its id is already
  /// present. Either every row is written or none is.
  fn record_kill(
    &self,
    kill: NewKill,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Whether a kill with this id has been recorded.
  fn contains_kill(
    &self,
    kill_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve a kill by id. Returns `None` if not found.
  fn get_kill(
    &self,
    kill_id: i64,
  ) -> impl Future<Output = Result<Option<KillRecord>, Self::Error>> + Send + '_;

  /// The attackers of a kill, in source order.
  fn attackers(
    &self,
    kill_id: i64,
  ) -> impl Future<Output = Result<Vec<AttackerRecord>, Self::Error>> + Send + '_;

  /// Total number of kill rows.
  fn count_kills(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Total number of attacker rows.
  fn count_attackers(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
