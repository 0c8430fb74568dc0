//! The network seam: one GET, one raw envelope.

use std::{collections::BTreeMap, future::Future, time::Duration};

use reqwest::{
  Client,
  header::{ACCEPT_ENCODING, HeaderMap, HeaderValue, USER_AGENT},
};
use zkbmirror_core::response::RemoteResponse;

use crate::{Error, Result};

/// Issues a single GET and returns the response as received. Bodies are not
/// inflated here.
pub trait Transport: Send + Sync {
  fn get<'a>(&'a self, url: &'a str) -> impl Future<Output = Result<RemoteResponse>> + Send + 'a;
}

/// [`Transport`] over `reqwest`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  /// Every request carries `user_agent`, asks for gzip and gives up after
  /// `timeout`.
  pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(
      USER_AGENT,
      HeaderValue::from_str(user_agent).map_err(|_| Error::InvalidHeader {
        name:  "user-agent",
        value: user_agent.to_owned(),
      })?,
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    let client = Client::builder()
      .default_headers(headers)
      .timeout(timeout)
      .build()?;
    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  async fn get(&self, url: &str) -> Result<RemoteResponse> {
    let resp = self.client.get(url).send().await?;

    let status = resp.status().as_u16();
    let headers = collect_headers(resp.headers());
    let body = resp.bytes().await?.to_vec();

    Ok(RemoteResponse { status, headers, body })
  }
}

/// Flatten a header map, joining repeated names with `, `. Values that are
/// not valid UTF-8 are dropped.
fn collect_headers(map: &HeaderMap) -> BTreeMap<String, String> {
  let mut headers: BTreeMap<String, String> = BTreeMap::new();
  for (name, value) in map {
    let Ok(value) = value.to_str() else { continue };
    headers
      .entry(name.as_str().to_owned())
      .and_modify(|joined| {
        joined.push_str(", ");
        joined.push_str(value);
      })
      .or_insert_with(|| value.to_owned());
  }
  headers
}
