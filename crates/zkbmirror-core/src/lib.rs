//! Domain types and the backend traits of the killboard mirror.
//!
//! Kills, the remote payload schema, and the seams the sync engine talks
//! through: [`store::KillStore`], [`reference::ReferenceData`] and
//! [`cache::ResponseCache`]. No HTTP or database code lives here.

// Trait methods spell out `+ Send` on their futures; impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod error;
pub mod kill;
pub mod reference;
pub mod remote;
pub mod response;
pub mod store;

pub use error::{Error, Result};
