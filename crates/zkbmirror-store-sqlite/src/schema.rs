//! SQL schemas for the zkbmirror SQLite databases.
//!
//! Each DDL block is idempotent thanks to `CREATE ... IF NOT EXISTS`, so it is
//! executed on every open.

/// Kill store DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Kills are strictly append-only.
-- No UPDATE or DELETE is ever issued against either table.
CREATE TABLE IF NOT EXISTS kills (
    kill_id           INTEGER PRIMARY KEY,
    kill_time         TEXT    NOT NULL,   -- ISO 8601 UTC
    solar_system_id   INTEGER NOT NULL,
    solar_system_name TEXT    NOT NULL,   -- resolved from reference data
    region_id         INTEGER NOT NULL,   -- resolved from reference data
    region_name       TEXT    NOT NULL,   -- resolved from reference data
    ship_type_id      INTEGER NOT NULL,
    victim            TEXT,
    character_id      INTEGER NOT NULL,
    character_name    TEXT    NOT NULL,
    corporation_id    INTEGER NOT NULL,
    corporation_name  TEXT    NOT NULL,
    alliance_id       INTEGER,
    alliance_name     TEXT
);

-- Written in the same transaction as the parent kill.
CREATE TABLE IF NOT EXISTS kill_attackers (
    kill_id           INTEGER NOT NULL REFERENCES kills(kill_id),
    position          INTEGER NOT NULL,   -- index in the source attacker list
    character_id      INTEGER NOT NULL,
    character_name    TEXT    NOT NULL,
    corporation_id    INTEGER NOT NULL,
    corporation_name  TEXT    NOT NULL,
    alliance_id       INTEGER,
    alliance_name     TEXT,
    PRIMARY KEY (kill_id, position)
);

CREATE INDEX IF NOT EXISTS kills_region_idx ON kills(region_id);
CREATE INDEX IF NOT EXISTS kills_time_idx   ON kills(kill_time);

PRAGMA user_version = 1;
";

/// Response cache DDL. Timestamps are Unix milliseconds.
pub const CACHE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS response_cache (
    key        TEXT    PRIMARY KEY,   -- full request URL
    status     INTEGER NOT NULL,
    headers    TEXT    NOT NULL,      -- JSON object
    body       BLOB    NOT NULL,      -- inflated body
    stored_at  INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS response_cache_expiry_idx ON response_cache(expires_at);
";

/// The subset of the static data export that the reference lookups read.
///
/// Never executed by the mirror itself: the export is opened read-only and
/// already has these tables. Exported so fixtures can build a minimal export
/// in memory. Like the real export it declares no foreign keys, so a system
/// may name a region that is missing.
pub const REFERENCE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS mapRegions (
    regionID   INTEGER PRIMARY KEY,
    regionName TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS mapSolarSystems (
    solarSystemID   INTEGER PRIMARY KEY,
    solarSystemName TEXT    NOT NULL,
    regionID        INTEGER NOT NULL
);
";
