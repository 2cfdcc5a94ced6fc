//! Coordinate conversion module
//!
//! Provides the Web Mercator projection, tile geometry, quadkeys and the
//! altitude-to-zoom mapping used to decide which imagery tiles to fetch.
//!
//! # Example
//!
//! ```
//! use flighteyes::coord::{zoom_for_altitude, GeoPoint, WebMercator};
//!
//! let scheme = WebMercator::new();
//! let point = scheme.project(GeoPoint::new(-122.39599, 37.78858)).unwrap();
//! let zoom = zoom_for_altitude(30_000.0, &scheme).unwrap();
//! let tile = scheme.tile_for(point, zoom).unwrap();
//!
//! assert_eq!(zoom, 10);
//! assert_eq!(tile.quadkey().as_str(), "0230102033");
//! ```

mod quadkey;
mod scheme;
mod types;
mod zoom;

pub use quadkey::QuadKey;
pub use scheme::{WebMercator, DEFAULT_TILE_SIZE, EARTH_RADIUS};
pub use types::{
    BoundingBox, CoordError, GeoPoint, ProjectedPoint, TileId, MAX_ABS_LAT, MAX_ABS_LON,
    MAX_ZOOM, MIN_ZOOM,
};
pub use zoom::{zoom_for_altitude, ALTITUDE_SCALE, DEFAULT_ALTITUDE};

/// Projects a geographic point with the standard Web Mercator scheme.
#[inline]
pub fn project(point: GeoPoint) -> Result<ProjectedPoint, CoordError> {
    WebMercator::default().project(point)
}
