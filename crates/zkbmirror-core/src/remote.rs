//! Payload schema of the remote killboard API.
//!
//! A page is a JSON array of kill objects; individual entries may be `null`.
//! Fields the mirror does not persist (items, zkb metadata, ...) are ignored.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
  Error, Result,
  kill::{KillRecord, Location, NewKill, Participant},
};

/// Legacy timestamp layout used by the killboard, always UTC.
const KILL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawKill {
  #[serde(rename = "killID")]
  pub kill_id:         i64,
  #[serde(rename = "killTime")]
  pub kill_time:       String,
  #[serde(rename = "solarSystemID")]
  pub solar_system_id: i64,
  #[serde(rename = "shipTypeID", default)]
  pub ship_type_id:    Option<i64>,
  pub victim:          RawVictim,
  #[serde(default)]
  pub attackers:       Vec<RawParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVictim {
  #[serde(default)]
  pub victim:       Option<String>,
  #[serde(rename = "shipTypeID", default)]
  pub ship_type_id: Option<i64>,
  #[serde(flatten)]
  pub participant:  RawParticipant,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
  #[serde(rename = "characterID", default)]
  pub character_id:     Option<i64>,
  #[serde(default)]
  pub character_name:   Option<String>,
  #[serde(rename = "corporationID", default)]
  pub corporation_id:   Option<i64>,
  #[serde(default)]
  pub corporation_name: Option<String>,
  #[serde(rename = "allianceID", default)]
  pub alliance_id:      Option<i64>,
  #[serde(default)]
  pub alliance_name:    Option<String>,
}

// ─── Page decoding ───────────────────────────────────────────────────────────

/// Split a response body into its raw entries.
///
/// A top-level `null` decodes as an empty page. Entries are left undecoded so
/// the caller can count them (the page-size check includes malformed and
/// `null` entries) and handle each one on its own.
pub fn decode_page(body: &[u8]) -> Result<Vec<Value>> {
  let entries: Option<Vec<Value>> = serde_json::from_slice(body)?;
  Ok(entries.unwrap_or_default())
}

impl RawKill {
  /// Decode a single page entry. `null` yields `Ok(None)`.
  pub fn from_entry(entry: Value) -> Result<Option<Self>> {
    if entry.is_null() {
      return Ok(None);
    }
    Ok(Some(serde_json::from_value(entry)?))
  }

  /// Parse `killTime`, accepting the legacy layout and RFC 3339.
  pub fn kill_time(&self) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(&self.kill_time, KILL_TIME_FORMAT) {
      return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(&self.kill_time)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|_| Error::KillTime(self.kill_time.clone()))
  }

  /// The victim's ship type, falling back to the top-level field.
  pub fn ship_type_id(&self) -> Result<i64> {
    self
      .victim
      .ship_type_id
      .or(self.ship_type_id)
      .ok_or(Error::MissingShipType { kill_id: self.kill_id })
  }

  /// Combine the payload with its resolved location.
  pub fn into_new_kill(self, location: Location) -> Result<NewKill> {
    let kill_time = self.kill_time()?;
    let ship_type_id = self.ship_type_id()?;

    let kill = KillRecord {
      kill_id: self.kill_id,
      kill_time,
      location,
      ship_type_id,
      victim_label: self.victim.victim.filter(|s| !s.is_empty()),
      victim: self.victim.participant.into(),
    };

    Ok(NewKill {
      kill,
      attackers: self.attackers.into_iter().map(Participant::from).collect(),
    })
  }
}

impl From<RawParticipant> for Participant {
  /// The killboard encodes "no alliance" as id `0` and an empty name.
  fn from(raw: RawParticipant) -> Self {
    Self {
      character_id:     raw.character_id.unwrap_or_default(),
      character_name:   raw.character_name.unwrap_or_default(),
      corporation_id:   raw.corporation_id.unwrap_or_default(),
      corporation_name: raw.corporation_name.unwrap_or_default(),
      alliance_id:      raw.alliance_id.filter(|id| *id != 0),
      alliance_name:    raw.alliance_name.filter(|n| !n.is_empty()),
    }
  }
}
