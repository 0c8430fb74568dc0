//! Kill types — the records mirrored from the killboard.
//!
//! A kill is immutable once written. Its attackers are stored alongside it in
//! the same transaction and are never written on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Participants ────────────────────────────────────────────────────────────

/// The character / corporation / alliance triple shared by victims and
/// attackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  /// `0` when the participant has no pilot (structures, NPCs).
  pub character_id:     i64,
  pub character_name:   String,
  pub corporation_id:   i64,
  pub corporation_name: String,
  /// Not every participant belongs to an alliance.
  pub alliance_id:      Option<i64>,
  pub alliance_name:    Option<String>,
}

// ─── Location ────────────────────────────────────────────────────────────────

/// Where a kill happened, resolved from static reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub solar_system_id:   i64,
  pub solar_system_name: String,
  pub region_id:         i64,
  pub region_name:       String,
}

// ─── KillRecord ──────────────────────────────────────────────────────────────

/// One persisted combat event. `kill_id` is the sole dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRecord {
  pub kill_id:      i64,
  pub kill_time:    DateTime<Utc>,
  pub location:     Location,
  pub ship_type_id: i64,
  /// Free-text victim description, when the source supplies one.
  pub victim_label: Option<String>,
  pub victim:       Participant,
}

/// One persisted attacker row, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerRecord {
  pub kill_id:  i64,
  /// Zero-based index within the source attacker list.
  pub position: u32,
  pub attacker: Participant,
}

// ─── NewKill ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::KillStore::record_kill`]: a fully enriched kill
/// and its attackers. Attacker rows inherit the kill's id.
#[derive(Debug, Clone)]
pub struct NewKill {
  pub kill:      KillRecord,
  /// Order is preserved and duplicates are kept.
  pub attackers: Vec<Participant>,
}

impl NewKill {
  /// The attacker rows that will be written for this kill.
  pub fn attacker_records(&self) -> Vec<AttackerRecord> {
    self
      .attackers
      .iter()
      .enumerate()
      .map(|(i, a)| AttackerRecord {
        kill_id:  self.kill.kill_id,
        position: i as u32,
        attacker: a.clone(),
      })
      .collect()
  }
}
