//! Provider trait and error types

use std::fmt;

use crate::coord::TileId;

/// Errors that can occur while downloading imagery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure or non-success HTTP status
    HttpError(String),
    /// Zoom level outside the provider's supported range
    UnsupportedZoom(u8),
    /// The provider answered with an empty or unusable body
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of encoded tile imagery.
///
/// Implementations return the raw bytes exactly as served (typically JPEG),
/// so callers can persist them verbatim before decoding.
pub trait Provider: Send + Sync {
    /// Downloads the encoded image for one tile.
    fn download_tile(&self, tile: &TileId) -> Result<Vec<u8>, ProviderError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    fn min_zoom(&self) -> u8;

    fn max_zoom(&self) -> u8;

    /// Returns true if the provider serves tiles at `zoom`.
    fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }
}
