//! [`SqliteReference`] — [`ReferenceData`] over a SQLite static data export.

use std::path::Path;

use rusqlite::{OpenFlags, OptionalExtension as _};
use zkbmirror_core::reference::{ReferenceData, SolarSystem};

use crate::Result;

/// Read-only handle on the `mapRegions` / `mapSolarSystems` tables.
#[derive(Clone)]
pub struct SqliteReference {
  conn: tokio_rusqlite::Connection,
}

impl SqliteReference {
  /// Open an existing export. The file is never created or written.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )
    .await?;
    Ok(Self { conn })
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Wrap an already-open connection, e.g. an in-memory fixture.
  pub fn from_connection(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }
}

impl ReferenceData for SqliteReference {
  type Error = crate::Error;

  async fn region_ids(&self) -> Result<Vec<i64>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT regionID FROM mapRegions ORDER BY regionID")?;
        let ids = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn solar_system(&self, solar_system_id: i64) -> Result<Option<SolarSystem>> {
    let system = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT solarSystemID, solarSystemName, regionID
               FROM mapSolarSystems
               WHERE solarSystemID = ?1",
              rusqlite::params![solar_system_id],
              |row| {
                Ok(SolarSystem {
                  solar_system_id: row.get(0)?,
                  name:            row.get(1)?,
                  region_id:       row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(system)
  }

  async fn region_name(&self, region_id: i64) -> Result<Option<String>> {
    let name = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT regionName FROM mapRegions WHERE regionID = ?1",
              rusqlite::params![region_id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }
}
