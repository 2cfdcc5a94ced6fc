//! FlightEyes - aerial imagery mosaics around a point
//!
//! This library turns a longitude/latitude and a viewing altitude into a
//! single stitched image: the point is projected to Web Mercator, the
//! altitude picks a zoom level, the tiles covering the point's tile are
//! arranged into a rectangular matrix and each tile image is copied into
//! one canvas.
//!
//! ```no_run
//! use flighteyes::cache::{default_cache_dir, CachedTileSource, DailyTileCache};
//! use flighteyes::coord::GeoPoint;
//! use flighteyes::pipeline::Pipeline;
//! use flighteyes::provider::{BingMapsProvider, ReqwestClient, DEFAULT_TIMEOUT_SECS};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = BingMapsProvider::new(ReqwestClient::new(DEFAULT_TIMEOUT_SECS)?);
//! let cache = DailyTileCache::for_today(default_cache_dir().unwrap());
//! let source = CachedTileSource::new(provider, cache);
//!
//! let point = GeoPoint::new(-122.39599, 37.78858);
//! Pipeline::default().run(point, 30_000.0, &source, Path::new("background.jpg"))?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod coverage;
pub mod grid;
pub mod logging;
pub mod mosaic;
pub mod pipeline;
pub mod provider;
