//! [`SqliteStore`] — the SQLite implementation of [`KillStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use zkbmirror_core::{
  kill::{AttackerRecord, KillRecord, NewKill},
  store::{InsertOutcome, KillStore},
};

use crate::{
  Result,
  encode::{RawAttacker, RawKill, RawParticipant},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The mirror's kill store, backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── KillStore impl ──────────────────────────────────────────────────────────

impl KillStore for SqliteStore {
  type Error = crate::Error;

  async fn record_kill(&self, input: NewKill) -> Result<InsertOutcome> {
    let kill = RawKill::encode(&input.kill);
    let attackers: Vec<(u32, RawParticipant)> = input
      .attacker_records()
      .iter()
      .map(|a| (a.position, RawParticipant::encode(&a.attacker)))
      .collect();

    let outcome = self
      .conn
      .call(move |conn| {
        // The write lock is held from the existence check until commit.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM kills WHERE kill_id = ?1",
            rusqlite::params![kill.kill_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          // Dropping `tx` rolls back; nothing has been written.
          return Ok(InsertOutcome::AlreadyPresent);
        }

        let v = &kill.participant;
        tx.execute(
          "INSERT INTO kills (
             kill_id, kill_time, solar_system_id, solar_system_name,
             region_id, region_name, ship_type_id, victim,
             character_id, character_name, corporation_id, corporation_name,
             alliance_id, alliance_name
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          rusqlite::params![
            kill.kill_id,
            kill.kill_time,
            kill.solar_system_id,
            kill.solar_system_name,
            kill.region_id,
            kill.region_name,
            kill.ship_type_id,
            kill.victim,
            v.character_id,
            v.character_name,
            v.corporation_id,
            v.corporation_name,
            v.alliance_id,
            v.alliance_name,
          ],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO kill_attackers (
               kill_id, position,
               character_id, character_name, corporation_id, corporation_name,
               alliance_id, alliance_name
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for (position, a) in &attackers {
            stmt.execute(rusqlite::params![
              kill.kill_id,
              position,
              a.character_id,
              a.character_name,
              a.corporation_id,
              a.corporation_name,
              a.alliance_id,
              a.alliance_name,
            ])?;
          }
        }

        tx.commit()?;
        Ok(InsertOutcome::Inserted)
      })
      .await?;

    Ok(outcome)
  }

  async fn contains_kill(&self, kill_id: i64) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM kills WHERE kill_id = ?1",
              rusqlite::params![kill_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn get_kill(&self, kill_id: i64) -> Result<Option<KillRecord>> {
    let raw: Option<RawKill> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM kills WHERE kill_id = ?1", RawKill::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![kill_id], RawKill::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawKill::into_kill).transpose()
  }

  async fn attackers(&self, kill_id: i64) -> Result<Vec<AttackerRecord>> {
    let raws: Vec<RawAttacker> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT kill_id, position,
                  character_id, character_name, corporation_id, corporation_name,
                  alliance_id, alliance_name
           FROM kill_attackers
           WHERE kill_id = ?1
           ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![kill_id], RawAttacker::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttacker::into_attacker).collect()
  }

  async fn count_kills(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM kills").await
  }

  async fn count_attackers(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM kill_attackers").await
  }
}
