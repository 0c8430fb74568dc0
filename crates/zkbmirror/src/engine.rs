//! [`SyncEngine`] — one incremental pass over every region.
//!
//! For each region the killboard is paged until it returns a page shorter
//! than [`PAGE_SIZE`]. The killboard offers no cursor or total count, so a
//! short page is the only end-of-data signal: an exactly-full page always
//! causes the next page to be requested.
//!
//! A failed page (transport error, non-200, empty or undecodable body) ends
//! only that region's pagination. Local failures (store, reference data,
//! cache) and kills in unknown systems abort the whole run.

use std::time::{Duration, Instant};

use tracing::Instrument as _;
use uuid::Uuid;
use zkbmirror_client::{QueryParams, Transport, ZkbClient};
use zkbmirror_core::{
  cache::ResponseCache,
  kill::Location,
  reference::ReferenceData,
  remote::{RawKill, decode_page},
  store::{InsertOutcome, KillStore},
};

use crate::{Result, SyncError};

/// Records per page served by the killboard.
pub const PAGE_SIZE: usize = 200;

/// Ship types worth mirroring: sovereignty structures.
pub const INTERESTING_SHIP_TYPES: [i64; 3] = [
  32250, // sovereignty blockade unit
  32226, // territorial claim unit
  32458, // infrastructure hub
];

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Counters reported once at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
  pub regions:         usize,
  /// Pages fetched, from the network or the cache.
  pub pages:           usize,
  /// Non-null, well-formed kills processed, new or not.
  pub kills:           usize,
  pub inserted:        usize,
  pub already_present: usize,
  /// Entries skipped because they did not match the kill schema.
  pub invalid:         usize,
  /// Regions whose pagination ended on a failed page.
  pub interrupted:     usize,
  pub elapsed:         Duration,
}

/// Why a region's pagination stopped early.
enum PageFailure {
  Transport(zkbmirror_client::Error),
  Status(u16),
  EmptyBody,
  Undecodable(zkbmirror_core::Error),
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SyncEngine<T, C, S, R> {
  client:       ZkbClient<T, C>,
  store:        S,
  reference:    R,
  past_seconds: u32,
  ship_types:   String,
}

impl<T, C, S, R> SyncEngine<T, C, S, R>
where
  T: Transport,
  C: ResponseCache,
  S: KillStore,
  R: ReferenceData,
{
  pub fn new(client: ZkbClient<T, C>, store: S, reference: R, past_seconds: u32) -> Self {
    let ship_types = INTERESTING_SHIP_TYPES
      .iter()
      .map(i64::to_string)
      .collect::<Vec<_>>()
      .join(",");

    Self {
      client,
      store,
      reference,
      past_seconds,
      ship_types,
    }
  }

  pub fn client(&self) -> &ZkbClient<T, C> { &self.client }

  pub fn store(&self) -> &S { &self.store }

  /// Parameters for one page of one region.
  ///
  /// The order is fixed: the resulting URL is the cache key.
  pub fn params(&self, region_id: i64, page: u32) -> QueryParams {
    QueryParams::new()
      .with("pastSeconds", self.past_seconds)
      .with("regionID", region_id)
      .with("shipTypeID", &self.ship_types)
      .with("page", page)
  }

  /// Run one full pass over every region.
  pub async fn run(&self) -> Result<SyncSummary> {
    let run_id = Uuid::new_v4();
    self
      .run_all()
      .instrument(tracing::info_span!("sync", %run_id))
      .await
  }

  async fn run_all(&self) -> Result<SyncSummary> {
    let started = Instant::now();
    let mut summary = SyncSummary::default();

    let regions = self
      .reference
      .region_ids()
      .await
      .map_err(|e| SyncError::Reference(Box::new(e)))?;
    tracing::info!(regions = regions.len(), "sync started");

    for region_id in regions {
      summary.regions += 1;
      self.sync_region(region_id, &mut summary).await?;
    }

    summary.elapsed = started.elapsed();
    tracing::info!(
      regions = summary.regions,
      pages = summary.pages,
      kills = summary.kills,
      inserted = summary.inserted,
      already_present = summary.already_present,
      invalid = summary.invalid,
      interrupted = summary.interrupted,
      elapsed_ms = summary.elapsed.as_millis() as u64,
      "sync finished"
    );
    Ok(summary)
  }

  async fn sync_region(&self, region_id: i64, summary: &mut SyncSummary) -> Result<()> {
    let mut page = 1;
    loop {
      let entries = match self.fetch_page(region_id, page).await? {
        Ok(entries) => entries,
        Err(failure) => {
          summary.interrupted += 1;
          match failure {
            PageFailure::Transport(e) => {
              tracing::warn!(region_id, page, error = %e, "request failed, skipping rest of region")
            }
            PageFailure::Status(status) => {
              tracing::warn!(region_id, page, status, "unexpected status, skipping rest of region")
            }
            PageFailure::EmptyBody => {
              tracing::warn!(region_id, page, "empty body, skipping rest of region")
            }
            PageFailure::Undecodable(e) => {
              tracing::warn!(region_id, page, error = %e, "undecodable page, skipping rest of region")
            }
          }
          return Ok(());
        }
      };
      summary.pages += 1;

      if entries.is_empty() {
        tracing::debug!(region_id, page, "no kills");
        return Ok(());
      }

      let page_len = entries.len();
      for entry in entries {
        let raw = match RawKill::from_entry(entry) {
          Ok(raw) => raw,
          Err(e) => {
            tracing::warn!(region_id, page, error = %e, "skipping malformed kill");
            summary.invalid += 1;
            continue;
          }
        };

        match self.enrich_and_persist(raw).await {
          Ok(None) => {}
          Ok(Some(outcome)) => {
            summary.kills += 1;
            match outcome {
              InsertOutcome::Inserted => summary.inserted += 1,
              InsertOutcome::AlreadyPresent => summary.already_present += 1,
            }
          }
          Err(SyncError::Decode(e)) => {
            tracing::warn!(region_id, page, error = %e, "skipping malformed kill");
            summary.invalid += 1;
          }
          Err(e) => return Err(e),
        }
      }

      tracing::debug!(region_id, page, entries = page_len, "page processed");
      if page_len < PAGE_SIZE {
        return Ok(());
      }
      page += 1;
    }
  }

  /// Fetch and split one page. The outer `Result` carries fatal errors, the
  /// inner one the reasons to stop paging this region.
  async fn fetch_page(
    &self,
    region_id: i64,
    page: u32,
  ) -> Result<Result<Vec<serde_json::Value>, PageFailure>> {
    let response = match self.client.request(&self.params(region_id, page)).await {
      Ok(response) => response,
      Err(e) if e.is_transient() => return Ok(Err(PageFailure::Transport(e))),
      Err(e) => return Err(e.into()),
    };

    if !response.is_ok() {
      return Ok(Err(PageFailure::Status(response.status)));
    }
    if response.is_empty() {
      return Ok(Err(PageFailure::EmptyBody));
    }
    Ok(decode_page(&response.body).map_err(PageFailure::Undecodable))
  }

  /// Resolve a kill's location and record it with its attackers.
  ///
  /// `None` in, `None` out. An unknown solar system or region is an error;
  /// a kill that is already stored is not.
  pub async fn enrich_and_persist(&self, raw: Option<RawKill>) -> Result<Option<InsertOutcome>> {
    let Some(raw) = raw else {
      return Ok(None);
    };

    let location = self.locate(raw.kill_id, raw.solar_system_id).await?;
    let kill_id = raw.kill_id;
    let new_kill = raw.into_new_kill(location)?;

    let outcome = self
      .store
      .record_kill(new_kill)
      .await
      .map_err(|e| SyncError::Store(Box::new(e)))?;

    if outcome == InsertOutcome::Inserted {
      tracing::debug!(kill_id, "kill recorded");
    }
    Ok(Some(outcome))
  }

  async fn locate(&self, kill_id: i64, solar_system_id: i64) -> Result<Location> {
    let system = self
      .reference
      .solar_system(solar_system_id)
      .await
      .map_err(|e| SyncError::Reference(Box::new(e)))?
      .ok_or(SyncError::UnknownSolarSystem { kill_id, solar_system_id })?;

    let region_name = self
      .reference
      .region_name(system.region_id)
      .await
      .map_err(|e| SyncError::Reference(Box::new(e)))?
      .ok_or(SyncError::UnknownRegion {
        solar_system_id,
        region_id: system.region_id,
      })?;

    Ok(Location {
      solar_system_id,
      solar_system_name: system.name,
      region_id: system.region_id,
      region_name,
    })
  }
}
