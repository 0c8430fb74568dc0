//! [`ZkbClient`] — cached, inflating requests against the killboard.

use zkbmirror_core::{
  cache::{ResponseCache, cached},
  response::RemoteResponse,
};

use crate::{Error, Result, inflate::inflate, params::QueryParams, transport::Transport};

pub const DEFAULT_BASE_URL: &str = "https://zkillboard.com/api/";

pub struct ZkbClient<T, C> {
  transport: T,
  cache:     C,
  base_url:  String,
}

impl<T, C> ZkbClient<T, C>
where
  T: Transport,
  C: ResponseCache,
{
  pub fn new(transport: T, cache: C) -> Self {
    Self {
      transport,
      cache,
      base_url: DEFAULT_BASE_URL.to_owned(),
    }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// The full request URL, which doubles as the cache key.
  pub fn url(&self, params: &QueryParams) -> String {
    let base = self.base_url.trim_end_matches('/');
    if params.is_empty() {
      format!("{base}/")
    } else {
      format!("{base}/{}/", params.path())
    }
  }

  /// Fetch `params`, serving from the cache when possible.
  ///
  /// Any HTTP status is returned (and cached) as a normal response; only
  /// transport and cache failures are errors.
  pub async fn request(&self, params: &QueryParams) -> Result<RemoteResponse> {
    let url = self.url(params);
    tracing::debug!(%url, "request start");

    let key = url.as_str();
    let transport = &self.transport;
    let response = cached(&self.cache, key, move || async move {
      tracing::debug!(url = key, "cache miss");
      let raw = transport.get(key).await?;
      Ok::<_, Error>(RemoteResponse {
        body: inflate(raw.body),
        ..raw
      })
    })
    .await?;

    tracing::debug!(
      %url,
      status = response.status,
      bytes = response.body.len(),
      "request finish"
    );
    Ok(response)
  }

  pub fn transport(&self) -> &T { &self.transport }

  pub fn cache(&self) -> &C { &self.cache }
}
