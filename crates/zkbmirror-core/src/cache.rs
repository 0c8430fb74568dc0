//! The `ResponseCache` trait and the memoisation helper built on it.
//!
//! The cache is the only throttle between the mirror and the remote API:
//! within an entry's lifetime the same URL is never fetched twice.

use std::future::Future;

use thiserror::Error;

use crate::response::RemoteResponse;

/// A cache backend failure, boxed so callers need not name the backend.
#[derive(Debug, Error)]
#[error("response cache: {0}")]
pub struct CacheFailure(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// Key-value storage for remote responses with backend-defined expiry.
pub trait ResponseCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the entry for `key` if it is present and unexpired.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<RemoteResponse>, Self::Error>> + Send + 'a;

  /// Store (or replace) the entry for `key`, restarting its lifetime.
  fn put<'a>(
    &'a self,
    key: &'a str,
    response: &'a RemoteResponse,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Return the cached response for `key`, or run `compute`, store its result
/// and return it.
///
/// `compute` is only invoked on a miss. If it fails, nothing is stored.
pub async fn cached<C, F, Fut, E>(cache: &C, key: &str, compute: F) -> Result<RemoteResponse, E>
where
  C: ResponseCache,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<RemoteResponse, E>>,
  E: From<CacheFailure>,
{
  if let Some(hit) = cache.get(key).await.map_err(|e| CacheFailure(Box::new(e)))? {
    return Ok(hit);
  }

  let response = compute().await?;
  cache
    .put(key, &response)
    .await
    .map_err(|e| CacheFailure(Box::new(e)))?;
  Ok(response)
}
