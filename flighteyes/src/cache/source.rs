//! Tile source backed by a provider and an optional daily disk cache.

use image::RgbImage;
use tracing::{debug, warn};

use super::disk::DailyTileCache;
use crate::coord::TileId;
use crate::mosaic::{TileSource, TileSourceError};
use crate::provider::Provider;

/// Fetches tiles from a [`Provider`], reading and filling a [`DailyTileCache`].
///
/// A cache hit is decoded without touching the network. On a miss the
/// downloaded bytes are stored verbatim and then decoded. Cache failures
/// never fail a fetch; they are logged and the provider is used instead.
pub struct CachedTileSource<P: Provider> {
    provider: P,
    cache: Option<DailyTileCache>,
}

impl<P: Provider> CachedTileSource<P> {
    pub fn new(provider: P, cache: DailyTileCache) -> Self {
        Self {
            provider,
            cache: Some(cache),
        }
    }

    /// Creates a source that always downloads.
    pub fn uncached(provider: P) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> Option<&DailyTileCache> {
        self.cache.as_ref()
    }

    fn lookup(&self, tile: &TileId) -> Option<RgbImage> {
        let cache = self.cache.as_ref()?;
        let quadkey = tile.quadkey();
        match cache.get(&quadkey) {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(image) => {
                    debug!(quadkey = %quadkey, "Tile cache hit");
                    Some(image)
                }
                Err(e) => {
                    warn!(quadkey = %quadkey, error = %e, "Discarding undecodable cached tile");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(quadkey = %quadkey, error = %e, "Tile cache read failed");
                None
            }
        }
    }
}

impl<P: Provider> TileSource for CachedTileSource<P> {
    fn fetch(&self, tile: &TileId) -> Result<RgbImage, TileSourceError> {
        if let Some(image) = self.lookup(tile) {
            return Ok(image);
        }

        debug!(tile = %tile, provider = self.provider.name(), "Downloading tile");
        let bytes = self.provider.download_tile(tile)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&tile.quadkey(), &bytes) {
                warn!(tile = %tile, error = %e, "Failed to cache tile");
            }
        }

        decode(&bytes)
    }
}

fn decode(bytes: &[u8]) -> Result<RgbImage, TileSourceError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}
