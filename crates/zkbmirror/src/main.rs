//! zkbmirror binary.
//!
//! Reads `zkbmirror.toml` (or the path given with `--config`) plus
//! `ZKBMIRROR_*` environment overrides, opens the kill store, the reference
//! data and the response cache, and runs one sync pass.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use zkbmirror::{Settings, SyncEngine};
use zkbmirror_client::{HttpTransport, ZkbClient};
use zkbmirror_store_sqlite::{SqliteCache, SqliteReference, SqliteStore, sqlite_path};

#[derive(Parser)]
#[command(author, version, about = "Mirror zKillboard structure kills into SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "zkbmirror.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  let settings = match Settings::load(&cli.config) {
    Ok(settings) => settings,
    Err(e) => {
      eprintln!("zkbmirror: {e}");
      return ExitCode::FAILURE;
    }
  };

  // Initialise tracing; `debug` only moves the default, RUST_LOG still wins.
  let default_level = if settings.debug {
    LevelFilter::DEBUG
  } else {
    LevelFilter::INFO
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  match run(settings).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{e:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
  let store_path = expand_tilde(&sqlite_path(&settings.database));
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open kill store at {store_path:?}"))?;

  let reference_path = expand_tilde(&sqlite_path(&settings.reference_database));
  let reference = SqliteReference::open(&reference_path)
    .await
    .with_context(|| format!("failed to open reference data at {reference_path:?}"))?;

  let cache_path = expand_tilde(&sqlite_path(&settings.cache_database));
  let cache = SqliteCache::open(&cache_path, settings.cache_ttl)
    .await
    .with_context(|| format!("failed to open response cache at {cache_path:?}"))?;
  let purged = cache
    .purge_expired()
    .await
    .context("failed to purge response cache")?;
  tracing::debug!(purged, "expired cache entries removed");

  let transport = HttpTransport::new(&settings.user_agent, settings.request_timeout)
    .context("failed to build HTTP client")?;
  let client = ZkbClient::new(transport, cache).with_base_url(settings.base_url.as_str());

  let engine = SyncEngine::new(client, store, reference, settings.past_seconds);
  engine.run().await.context("sync failed")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
