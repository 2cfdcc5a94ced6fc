//! Per-tile image source.

use image::RgbImage;
use thiserror::Error;

use crate::coord::TileId;
use crate::provider::ProviderError;

/// Errors a tile source can report for a single tile.
#[derive(Debug, Error)]
pub enum TileSourceError {
    /// The imagery provider failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The fetched bytes are not a decodable image.
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Supplies the decoded image for a tile.
///
/// Implementations must be thread-safe so tiles can be fetched from a
/// worker pool.
pub trait TileSource: Send + Sync {
    fn fetch(&self, tile: &TileId) -> Result<RgbImage, TileSourceError>;
}

impl<F> TileSource for F
where
    F: Fn(&TileId) -> Result<RgbImage, TileSourceError> + Send + Sync,
{
    fn fetch(&self, tile: &TileId) -> Result<RgbImage, TileSourceError> {
        self(tile)
    }
}
