//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Kill timestamps are stored as RFC 3339 strings, cache timestamps as Unix
//! milliseconds, and response headers as compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use zkbmirror_core::{
  kill::{AttackerRecord, KillRecord, Location, Participant},
  response::RemoteResponse,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Headers ─────────────────────────────────────────────────────────────────

pub fn encode_headers(headers: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(headers)?)
}

pub fn decode_headers(s: &str) -> Result<BTreeMap<String, String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Participant columns, shared by `kills` and `kill_attackers`.
pub struct RawParticipant {
  pub character_id:     i64,
  pub character_name:   String,
  pub corporation_id:   i64,
  pub corporation_name: String,
  pub alliance_id:      Option<i64>,
  pub alliance_name:    Option<String>,
}

impl RawParticipant {
  /// Read six participant columns starting at `first`.
  pub fn from_row(row: &rusqlite::Row<'_>, first: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      character_id:     row.get(first)?,
      character_name:   row.get(first + 1)?,
      corporation_id:   row.get(first + 2)?,
      corporation_name: row.get(first + 3)?,
      alliance_id:      row.get(first + 4)?,
      alliance_name:    row.get(first + 5)?,
    })
  }

  pub fn encode(p: &Participant) -> Self {
    Self {
      character_id:     p.character_id,
      character_name:   p.character_name.clone(),
      corporation_id:   p.corporation_id,
      corporation_name: p.corporation_name.clone(),
      alliance_id:      p.alliance_id,
      alliance_name:    p.alliance_name.clone(),
    }
  }

  pub fn into_participant(self) -> Participant {
    Participant {
      character_id:     self.character_id,
      character_name:   self.character_name,
      corporation_id:   self.corporation_id,
      corporation_name: self.corporation_name,
      alliance_id:      self.alliance_id,
      alliance_name:    self.alliance_name,
    }
  }
}

/// Raw values read directly from (or written to) a `kills` row.
pub struct RawKill {
  pub kill_id:           i64,
  pub kill_time:         String,
  pub solar_system_id:   i64,
  pub solar_system_name: String,
  pub region_id:         i64,
  pub region_name:       String,
  pub ship_type_id:      i64,
  pub victim:            Option<String>,
  pub participant:       RawParticipant,
}

impl RawKill {
  pub const COLUMNS: &'static str = "kill_id, kill_time, solar_system_id, \
    solar_system_name, region_id, region_name, ship_type_id, victim, \
    character_id, character_name, corporation_id, corporation_name, \
    alliance_id, alliance_name";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kill_id:           row.get(0)?,
      kill_time:         row.get(1)?,
      solar_system_id:   row.get(2)?,
      solar_system_name: row.get(3)?,
      region_id:         row.get(4)?,
      region_name:       row.get(5)?,
      ship_type_id:      row.get(6)?,
      victim:            row.get(7)?,
      participant:       RawParticipant::from_row(row, 8)?,
    })
  }

  pub fn encode(kill: &KillRecord) -> Self {
    Self {
      kill_id:           kill.kill_id,
      kill_time:         encode_dt(kill.kill_time),
      solar_system_id:   kill.location.solar_system_id,
      solar_system_name: kill.location.solar_system_name.clone(),
      region_id:         kill.location.region_id,
      region_name:       kill.location.region_name.clone(),
      ship_type_id:      kill.ship_type_id,
      victim:            kill.victim_label.clone(),
      participant:       RawParticipant::encode(&kill.victim),
    }
  }

  pub fn into_kill(self) -> Result<KillRecord> {
    Ok(KillRecord {
      kill_id:      self.kill_id,
      kill_time:    decode_dt(&self.kill_time)?,
      location:     Location {
        solar_system_id:   self.solar_system_id,
        solar_system_name: self.solar_system_name,
        region_id:         self.region_id,
        region_name:       self.region_name,
      },
      ship_type_id: self.ship_type_id,
      victim_label: self.victim,
      victim:       self.participant.into_participant(),
    })
  }
}

/// Raw values read directly from a `kill_attackers` row.
pub struct RawAttacker {
  pub kill_id:     i64,
  pub position:    i64,
  pub participant: RawParticipant,
}

impl RawAttacker {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kill_id:     row.get(0)?,
      position:    row.get(1)?,
      participant: RawParticipant::from_row(row, 2)?,
    })
  }

  pub fn into_attacker(self) -> Result<AttackerRecord> {
    let position = u32::try_from(self.position).map_err(|_| Error::OutOfRange {
      column: "position",
      value:  self.position,
    })?;
    Ok(AttackerRecord {
      kill_id: self.kill_id,
      position,
      attacker: self.participant.into_participant(),
    })
  }
}

/// Raw values read directly from a `response_cache` row.
pub struct RawResponse {
  pub status:  i64,
  pub headers: String,
  pub body:    Vec<u8>,
}

impl RawResponse {
  pub fn into_response(self) -> Result<RemoteResponse> {
    let status = u16::try_from(self.status).map_err(|_| Error::OutOfRange {
      column: "status",
      value:  self.status,
    })?;
    Ok(RemoteResponse {
      status,
      headers: decode_headers(&self.headers)?,
      body: self.body,
    })
  }
}
