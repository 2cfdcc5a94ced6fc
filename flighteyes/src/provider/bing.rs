//! Bing Maps aerial imagery provider.
//!
//! Bing addresses tiles by quadkey rather than XYZ:
//!
//! `http://ecn.t3.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=195&mkt=en-US&key={key}`
//!
//! The URL template is configurable. `{quadkey}` is replaced by the tile's
//! quadkey and `{key}` by the access key (empty when none is set).

use tracing::debug;

use crate::coord::TileId;
use crate::provider::{HttpClient, Provider, ProviderError};

/// Default Bing aerial tile URL template.
pub const BING_URL_TEMPLATE: &str =
    "http://ecn.t3.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=195&mkt=en-US&key={key}";

/// Coarsest level Bing serves; zoom 0 has no quadkey digits.
const MIN_ZOOM: u8 = 1;

/// Finest level addressable by a Bing quadkey.
const MAX_ZOOM: u8 = 23;

/// Bing Maps aerial imagery provider.
///
/// # Example
///
/// ```ignore
/// use flighteyes::provider::{BingMapsProvider, ReqwestClient};
///
/// let client = ReqwestClient::new(30).unwrap();
/// let provider = BingMapsProvider::new(client).with_api_key("YOUR_KEY");
/// ```
pub struct BingMapsProvider<C: HttpClient> {
    http_client: C,
    url_template: String,
    api_key: Option<String>,
}

impl<C: HttpClient> BingMapsProvider<C> {
    /// Creates a provider using the default URL template and no key.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            url_template: BING_URL_TEMPLATE.to_string(),
            api_key: None,
        }
    }

    /// Sets the access key substituted for `{key}`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replaces the URL template.
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    /// Builds the tile URL for the given tile.
    fn build_url(&self, tile: &TileId) -> String {
        self.url_template
            .replace("{quadkey}", tile.quadkey().as_str())
            .replace("{key}", self.api_key.as_deref().unwrap_or(""))
    }
}

impl<C: HttpClient> Provider for BingMapsProvider<C> {
    fn download_tile(&self, tile: &TileId) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let url = self.build_url(tile);
        debug!(tile = %tile, "Downloading tile");
        self.http_client.get_image(&url)
    }

    fn name(&self) -> &str {
        "Bing Maps"
    }

    fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }
}
