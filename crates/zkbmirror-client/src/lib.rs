//! HTTP client for the zKillboard API.
//!
//! Requests are described by an ordered [`QueryParams`], turned into a
//! path-segment URL, and served through a [`ResponseCache`] so that the same
//! URL is fetched at most once per cache lifetime.
//!
//! [`ResponseCache`]: zkbmirror_core::cache::ResponseCache

pub mod client;
pub mod error;
pub mod inflate;
pub mod params;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, ZkbClient};
pub use error::{Error, Result};
pub use params::QueryParams;
pub use transport::{HttpTransport, Transport};
