//! Coordinate type definitions

use std::fmt;

/// Longitude bound; ±180 is the antimeridian seam and is excluded.
pub const MAX_ABS_LON: f64 = 180.0;

/// Latitude bound; the Mercator logarithm diverges at the poles, so the
/// bound itself is excluded.
pub const MAX_ABS_LAT: f64 = 90.0;

/// Zoom range addressable by a quadkey (one digit per level).
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 23;

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude, positive east
    pub lon: f64,
    /// Latitude, positive north
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a point from longitude and latitude, in that order.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lon {:.5}, lat {:.5})", self.lon, self.lat)
    }
}

/// Point on the Web Mercator plane, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single tile in the Web Mercator / Slippy Map grid.
///
/// Tiles at one zoom level cover the projected square without gaps or
/// overlaps. Ordering is (zoom, row, col) so sorted tiles come out in
/// row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    /// Zoom level
    pub zoom: u8,
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
}

impl TileId {
    /// Creates a tile identifier.
    pub fn new(col: u32, row: u32, zoom: u8) -> Self {
        Self { zoom, row, col }
    }

    /// Number of tiles along one axis at this tile's zoom level.
    #[inline]
    pub fn grid_size(&self) -> u32 {
        1u32 << self.zoom
    }

    /// Returns true if row and col fall inside the grid for this zoom.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.zoom <= MAX_ZOOM && self.row < self.grid_size() && self.col < self.grid_size()
    }

    /// Returns the tile at `zoom` (coarser or equal) that contains this tile.
    ///
    /// Returns `None` if `zoom` is finer than this tile.
    pub fn ancestor(&self, zoom: u8) -> Option<TileId> {
        if zoom > self.zoom {
            return None;
        }
        let shift = self.zoom - zoom;
        Some(TileId::new(self.col >> shift, self.row >> shift, zoom))
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Axis-aligned box on the projected plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns true if the point lies inside or on the edge of the box.
    pub fn contains(&self, point: &ProjectedPoint) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Longitude or latitude outside the projectable range
    InvalidCoordinate { lon: f64, lat: f64 },
    /// Altitude is zero, negative or not a number
    InvalidAltitude(f64),
    /// Zoom level the tile scheme cannot represent
    UnsupportedZoom(u8),
    /// Quadkey contains invalid characters or is too long
    InvalidQuadkey(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidCoordinate { lon, lat } => {
                write!(
                    f,
                    "Invalid coordinate: lon {}, lat {} (|lon| must be below {}, |lat| below {})",
                    lon, lat, MAX_ABS_LON, MAX_ABS_LAT
                )
            }
            CoordError::InvalidAltitude(altitude) => {
                write!(f, "Invalid altitude: {} (must be greater than 0)", altitude)
            }
            CoordError::UnsupportedZoom(zoom) => {
                write!(f, "Unsupported zoom level: {} for this tile scheme", zoom)
            }
            CoordError::InvalidQuadkey(quadkey) => {
                write!(
                    f,
                    "Invalid quadkey: '{}' (must contain only digits 0-3 and length <= {})",
                    quadkey, MAX_ZOOM
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
