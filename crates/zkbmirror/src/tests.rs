//! End-to-end sync runs against a scripted killboard and in-memory SQLite.

use std::{
  collections::{BTreeMap, HashMap},
  sync::Mutex,
  time::Duration,
};

use serde_json::{Value, json};
use zkbmirror_client::{Transport, ZkbClient};
use zkbmirror_core::{response::RemoteResponse, store::KillStore};
use zkbmirror_store_sqlite::{REFERENCE_SCHEMA, SqliteCache, SqliteReference, SqliteStore};

use crate::{PAGE_SIZE, SyncEngine, SyncError};

const FORGE: i64 = 10000002;
const DOMAIN: i64 = 10000043;
const JITA: i64 = 30000142;
const AMARR: i64 = 30002187;

// ─── Scripted killboard ──────────────────────────────────────────────────────

enum Reply {
  Body(Vec<u8>),
  Status(u16),
  Offline,
}

/// Serves scripted replies keyed by `(regionID, page)`. Anything unscripted
/// is an empty page.
#[derive(Default)]
struct ScriptedTransport {
  replies: HashMap<(i64, u32), Reply>,
  seen:    Mutex<Vec<String>>,
}

impl ScriptedTransport {
  fn reply(mut self, region_id: i64, page: u32, reply: Reply) -> Self {
    self.replies.insert((region_id, page), reply);
    self
  }

  /// Script consecutive pages of a region, starting at page 1.
  fn pages(mut self, region_id: i64, pages: Vec<Vec<Value>>) -> Self {
    for (i, entries) in pages.into_iter().enumerate() {
      let body = serde_json::to_vec(&entries).unwrap();
      self.replies.insert((region_id, i as u32 + 1), Reply::Body(body));
    }
    self
  }

  fn urls(&self) -> Vec<String> { self.seen.lock().unwrap().clone() }

  fn calls(&self) -> usize { self.seen.lock().unwrap().len() }

  /// Pages requested for one region, in order.
  fn pages_for(&self, region_id: i64) -> Vec<u32> {
    self
      .urls()
      .iter()
      .filter_map(|url| parse_key(url))
      .filter(|(region, _)| *region == region_id)
      .map(|(_, page)| page)
      .collect()
  }
}

fn parse_key(url: &str) -> Option<(i64, u32)> {
  let segments: Vec<&str> = url.split('/').collect();
  let value_of = |key: &str| {
    segments
      .iter()
      .position(|s| *s == key)
      .and_then(|i| segments.get(i + 1))
      .copied()
  };
  Some((value_of("regionID")?.parse().ok()?, value_of("page")?.parse().ok()?))
}

impl Transport for ScriptedTransport {
  async fn get(&self, url: &str) -> zkbmirror_client::Result<RemoteResponse> {
    self.seen.lock().unwrap().push(url.to_owned());

    let (status, body) = match parse_key(url).and_then(|key| self.replies.get(&key)) {
      None => (200, b"[]".to_vec()),
      Some(Reply::Body(body)) => (200, body.clone()),
      Some(Reply::Status(status)) => (*status, Vec::new()),
      Some(Reply::Offline) => {
        return Err(reqwest::Client::new().get("not a url").build().unwrap_err().into());
      }
    };
    Ok(RemoteResponse {
      status,
      headers: BTreeMap::new(),
      body,
    })
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn kill(kill_id: i64, solar_system_id: i64) -> Value {
  json!({
    "killID": kill_id,
    "solarSystemID": solar_system_id,
    "killTime": "2015-02-03 04:05:06",
    "victim": {
      "shipTypeID": 32226,
      "characterID": 0,
      "characterName": "",
      "corporationID": 98000001,
      "corporationName": "Holders",
      "allianceID": 99000009,
      "allianceName": "Holding Alliance"
    },
    "attackers": [
      {
        "characterID": 9001,
        "characterName": "Pilot One",
        "corporationID": 98000002,
        "corporationName": "Shooters",
        "allianceID": 0,
        "allianceName": ""
      },
      {
        "characterID": 9002,
        "characterName": "Pilot Two",
        "corporationID": 98000002,
        "corporationName": "Shooters",
        "allianceID": 99000001,
        "allianceName": "Big Alliance"
      }
    ]
  })
}

/// `len` consecutive kills in Jita, starting at `first_id`.
fn kills(first_id: i64, len: usize) -> Vec<Value> {
  (0..len as i64).map(|i| kill(first_id + i, JITA)).collect()
}

async fn reference() -> SqliteReference {
  let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
  conn
    .call(|conn| {
      conn.execute_batch(REFERENCE_SCHEMA)?;
      conn.execute_batch(
        "INSERT INTO mapRegions VALUES (10000002, 'The Forge'), (10000043, 'Domain');
         INSERT INTO mapSolarSystems VALUES (30000142, 'Jita', 10000002);
         INSERT INTO mapSolarSystems VALUES (30002187, 'Amarr', 10000043);
         INSERT INTO mapSolarSystems VALUES (30000001, 'Orphan', 10000099);",
      )?;
      Ok(())
    })
    .await
    .unwrap();
  SqliteReference::from_connection(conn)
}

type Engine = SyncEngine<ScriptedTransport, SqliteCache, SqliteStore, SqliteReference>;

async fn engine_with_ttl(transport: ScriptedTransport, ttl: Duration) -> Engine {
  let cache = SqliteCache::open_in_memory(ttl).await.unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  SyncEngine::new(ZkbClient::new(transport, cache), store, reference().await, 86_400)
}

async fn engine(transport: ScriptedTransport) -> Engine {
  engine_with_ttl(transport, Duration::from_secs(3600)).await
}

fn transport(engine: &Engine) -> &ScriptedTransport { engine.client().transport() }

// ─── Pagination ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn short_page_ends_region() {
  let t = ScriptedTransport::default().pages(FORGE, vec![
    kills(1, 200),
    kills(201, 200),
    kills(401, 150),
  ]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(transport(&e).pages_for(FORGE), vec![1, 2, 3]);
  assert_eq!(transport(&e).pages_for(DOMAIN), vec![1]);
  assert_eq!(summary.inserted, 550);
  assert_eq!(summary.kills, 550);
  assert_eq!(summary.regions, 2);
  assert_eq!(e.store().count_kills().await.unwrap(), 550);
  assert_eq!(e.store().count_attackers().await.unwrap(), 1100);
}

#[tokio::test]
async fn full_last_page_requests_one_more() {
  let t = ScriptedTransport::default().pages(FORGE, vec![
    kills(1, 200),
    kills(201, 200),
    kills(401, 200),
  ]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(transport(&e).pages_for(FORGE), vec![1, 2, 3, 4]);
  assert_eq!(summary.inserted, 600);
}

#[tokio::test]
async fn null_entries_count_toward_page_length() {
  let mut first = kills(1, PAGE_SIZE - 1);
  first.push(Value::Null);
  let t = ScriptedTransport::default().pages(FORGE, vec![first, kills(500, 3)]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(transport(&e).pages_for(FORGE), vec![1, 2]);
  assert_eq!(summary.inserted, PAGE_SIZE - 1 + 3);
  assert_eq!(summary.invalid, 0);
}

#[tokio::test]
async fn top_level_null_is_an_empty_page() {
  let t = ScriptedTransport::default().reply(FORGE, 1, Reply::Body(b"null".to_vec()));
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(summary.inserted, 0);
  assert_eq!(summary.interrupted, 0);
}

#[tokio::test]
async fn request_url_shape() {
  let e = engine(ScriptedTransport::default()).await;
  e.run().await.unwrap();

  assert_eq!(transport(&e).urls(), vec![
    "https://zkillboard.com/api/pastSeconds/86400/regionID/10000002/shipTypeID/32250,32226,32458/page/1/",
    "https://zkillboard.com/api/pastSeconds/86400/regionID/10000043/shipTypeID/32250,32226,32458/page/1/",
  ]);
}

// ─── Idempotence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_run_inserts_nothing_and_hits_cache() {
  let t = ScriptedTransport::default().pages(FORGE, vec![kills(1, 200), kills(201, 50)]);
  let e = engine(t).await;

  let first = e.run().await.unwrap();
  let calls = transport(&e).calls();
  let second = e.run().await.unwrap();

  assert_eq!(first.inserted, 250);
  assert_eq!(second.inserted, 0);
  assert_eq!(second.already_present, 250);
  assert_eq!(transport(&e).calls(), calls);
  assert_eq!(e.store().count_kills().await.unwrap(), 250);
}

#[tokio::test]
async fn second_run_without_cache_still_inserts_nothing() {
  let t = ScriptedTransport::default().pages(FORGE, vec![kills(1, 10)]);
  let e = engine_with_ttl(t, Duration::ZERO).await;

  e.run().await.unwrap();
  let calls = transport(&e).calls();
  let second = e.run().await.unwrap();

  assert_eq!(transport(&e).calls(), calls * 2);
  assert_eq!(second.inserted, 0);
  assert_eq!(second.already_present, 10);
  assert_eq!(e.store().count_attackers().await.unwrap(), 20);
}

#[tokio::test]
async fn kill_seen_in_two_regions_is_stored_once() {
  let t = ScriptedTransport::default()
    .pages(FORGE, vec![vec![kill(7, JITA)]])
    .pages(DOMAIN, vec![vec![kill(7, JITA)]]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(summary.inserted, 1);
  assert_eq!(summary.already_present, 1);
  assert_eq!(e.store().count_kills().await.unwrap(), 1);
  assert_eq!(e.store().count_attackers().await.unwrap(), 2);
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn kills_are_enriched_with_names() {
  let t = ScriptedTransport::default().pages(DOMAIN, vec![vec![kill(42, AMARR)]]);
  let e = engine(t).await;
  e.run().await.unwrap();

  let k = e.store().get_kill(42).await.unwrap().unwrap();
  assert_eq!(k.location.solar_system_name, "Amarr");
  assert_eq!(k.location.region_id, DOMAIN);
  assert_eq!(k.location.region_name, "Domain");
  assert_eq!(k.ship_type_id, 32226);
  assert_eq!(k.victim.alliance_name.as_deref(), Some("Holding Alliance"));

  let attackers = e.store().attackers(42).await.unwrap();
  assert_eq!(attackers.len(), 2);
  assert_eq!(attackers[0].attacker.character_name, "Pilot One");
  assert_eq!(attackers[0].attacker.alliance_id, None);
  assert_eq!(attackers[1].attacker.alliance_id, Some(99000001));
}

#[tokio::test]
async fn unknown_solar_system_aborts_the_run() {
  let t = ScriptedTransport::default().pages(FORGE, vec![vec![kill(1, 30099999)]]);
  let e = engine(t).await;

  let err = e.run().await.unwrap_err();

  assert!(matches!(
    err,
    SyncError::UnknownSolarSystem { kill_id: 1, solar_system_id: 30099999 }
  ));
  assert_eq!(e.store().count_kills().await.unwrap(), 0);
  assert!(transport(&e).pages_for(DOMAIN).is_empty());
}

#[tokio::test]
async fn unknown_region_aborts_the_run() {
  let t = ScriptedTransport::default().pages(FORGE, vec![vec![kill(1, 30000001)]]);
  let e = engine(t).await;

  assert!(matches!(
    e.run().await,
    Err(SyncError::UnknownRegion { region_id: 10000099, .. })
  ));
}

#[tokio::test]
async fn enrich_and_persist_passes_null_through() {
  let e = engine(ScriptedTransport::default()).await;
  assert!(e.enrich_and_persist(None).await.unwrap().is_none());
}

// ─── Failure isolation ───────────────────────────────────────────────────────

#[tokio::test]
async fn error_status_skips_only_that_region() {
  let t = ScriptedTransport::default()
    .reply(FORGE, 1, Reply::Status(503))
    .pages(DOMAIN, vec![vec![kill(42, AMARR)]]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(summary.interrupted, 1);
  assert_eq!(summary.inserted, 1);
  assert!(e.store().contains_kill(42).await.unwrap());
}

#[tokio::test]
async fn transport_error_keeps_earlier_pages() {
  let t = ScriptedTransport::default()
    .pages(FORGE, vec![kills(1, 200)])
    .reply(FORGE, 2, Reply::Offline)
    .pages(DOMAIN, vec![vec![kill(1000, AMARR)]]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(transport(&e).pages_for(FORGE), vec![1, 2]);
  assert_eq!(summary.interrupted, 1);
  assert_eq!(summary.inserted, 201);
}

#[tokio::test]
async fn undecodable_and_blank_bodies_skip_the_region() {
  let t = ScriptedTransport::default()
    .reply(FORGE, 1, Reply::Body(b"<html>busy</html>".to_vec()))
    .reply(DOMAIN, 1, Reply::Body(b"  \n".to_vec()));
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(summary.interrupted, 2);
  assert_eq!(summary.pages, 0);
}

#[tokio::test]
async fn malformed_records_are_skipped_and_counted() {
  let mut bad_time = kill(3, JITA);
  bad_time["killTime"] = json!("yesterday");
  let t = ScriptedTransport::default().pages(FORGE, vec![vec![
    kill(1, JITA),
    json!({ "solarSystemID": JITA }),
    bad_time,
  ]]);
  let e = engine(t).await;

  let summary = e.run().await.unwrap();

  assert_eq!(summary.inserted, 1);
  assert_eq!(summary.invalid, 2);
  assert!(!e.store().contains_kill(3).await.unwrap());
}
