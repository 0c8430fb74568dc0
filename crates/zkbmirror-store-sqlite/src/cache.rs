//! [`SqliteCache`] — a disk-backed [`ResponseCache`] with a fixed lifetime.

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use zkbmirror_core::{cache::ResponseCache, response::RemoteResponse};

use crate::{
  Result,
  encode::{RawResponse, encode_headers},
  schema::CACHE_SCHEMA,
};

/// Remote responses keyed by request URL.
///
/// An entry is served until `ttl` has elapsed since it was stored; after that
/// it is treated as absent and the next `put` replaces it.
#[derive(Clone)]
pub struct SqliteCache {
  conn:   tokio_rusqlite::Connection,
  ttl_ms: i64,
}

impl SqliteCache {
  pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, ttl).await
  }

  /// Open an in-memory cache — useful for testing.
  pub async fn open_in_memory(ttl: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, ttl).await
  }

  async fn init(conn: tokio_rusqlite::Connection, ttl: Duration) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(CACHE_SCHEMA)?;
        Ok(())
      })
      .await?;
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    Ok(Self { conn, ttl_ms })
  }

  /// Delete every expired entry; returns how many were removed.
  pub async fn purge_expired(&self) -> Result<usize> {
    let now = Utc::now().timestamp_millis();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM response_cache WHERE expires_at <= ?1",
          rusqlite::params![now],
        )?)
      })
      .await?;
    Ok(removed)
  }
}

impl ResponseCache for SqliteCache {
  type Error = crate::Error;

  async fn get(&self, key: &str) -> Result<Option<RemoteResponse>> {
    let key = key.to_owned();
    let now = Utc::now().timestamp_millis();

    let raw: Option<RawResponse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT status, headers, body FROM response_cache
               WHERE key = ?1 AND expires_at > ?2",
              rusqlite::params![key, now],
              |row| {
                Ok(RawResponse {
                  status:  row.get(0)?,
                  headers: row.get(1)?,
                  body:    row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawResponse::into_response).transpose()
  }

  async fn put(&self, key: &str, response: &RemoteResponse) -> Result<()> {
    let key = key.to_owned();
    let status = i64::from(response.status);
    let headers = encode_headers(&response.headers)?;
    let body = response.body.clone();
    let stored_at = Utc::now().timestamp_millis();
    let expires_at = stored_at.saturating_add(self.ttl_ms);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO response_cache
             (key, status, headers, body, stored_at, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![key, status, headers, body, stored_at, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
