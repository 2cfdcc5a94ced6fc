//! Aerial imagery provider abstraction
//!
//! This module provides the trait and implementation for downloading
//! encoded tile imagery. Tiles are addressed by [`TileId`](crate::coord::TileId);
//! the Bing provider turns them into quadkey URLs.
//!
//! ```ignore
//! use flighteyes::provider::{BingMapsProvider, Provider, ReqwestClient, DEFAULT_TIMEOUT_SECS};
//!
//! let provider = BingMapsProvider::new(ReqwestClient::new(DEFAULT_TIMEOUT_SECS)?);
//! let jpeg = provider.download_tile(&tile)?;
//! ```

mod bing;
mod http;
mod types;

pub use bing::{BingMapsProvider, BING_URL_TEMPLATE};
pub use http::{HttpClient, ReqwestClient, TileResponse, DEFAULT_TIMEOUT_SECS, USER_AGENT};
pub use types::{Provider, ProviderError};

#[cfg(test)]
pub use http::tests::CannedClient;
