//! Web Mercator tile scheme.
//!
//! The scheme is a plain value: projection constants, tile pixel size and
//! the zoom range. Every stage that needs tile geometry receives it
//! explicitly, so tests can substitute a different tile size or zoom cap.

use std::f64::consts::{FRAC_PI_2, PI};

use super::types::{
    BoundingBox, CoordError, GeoPoint, ProjectedPoint, TileId, MAX_ABS_LAT, MAX_ABS_LON,
    MAX_ZOOM, MIN_ZOOM,
};

/// WGS84 semi-major axis used by spherical Web Mercator, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Pixel width and height of a standard web map tile.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Fraction of a tile treated as touching rather than overlapping.
const EDGE_EPSILON: f64 = 1e-6;

/// Spherical Web Mercator (EPSG:3857) tile scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    radius: f64,
    tile_size: u32,
    max_zoom: u8,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS,
            tile_size: DEFAULT_TILE_SIZE,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl WebMercator {
    /// Creates the standard scheme: 256 px tiles, zoom 0 to 23.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tile pixel size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Caps the finest zoom level. Values above the quadkey limit are clamped.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom.min(MAX_ZOOM);
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Half the width of the projected square (metres from origin to edge).
    #[inline]
    pub fn origin_shift(&self) -> f64 {
        PI * self.radius
    }

    /// Width of one tile in metres at the given zoom level.
    #[inline]
    pub fn tile_span(&self, zoom: u8) -> f64 {
        2.0 * self.origin_shift() / f64::from(1u32 << zoom)
    }

    /// Projects a geographic point onto the Web Mercator plane.
    ///
    /// Rejects the point if either axis is out of range: `|lon| >= 180`,
    /// `|lat| >= 90`, or a non-finite value.
    pub fn project(&self, point: GeoPoint) -> Result<ProjectedPoint, CoordError> {
        let GeoPoint { lon, lat } = point;
        let lon_ok = lon.is_finite() && lon.abs() < MAX_ABS_LON;
        let lat_ok = lat.is_finite() && lat.abs() < MAX_ABS_LAT;
        if !lon_ok || !lat_ok {
            return Err(CoordError::InvalidCoordinate { lon, lat });
        }

        let x = self.radius * lon.to_radians();
        let sin_lat = lat.to_radians().sin();
        let y = self.radius / 2.0 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln();

        if !y.is_finite() {
            return Err(CoordError::InvalidCoordinate { lon, lat });
        }

        Ok(ProjectedPoint { x, y })
    }

    /// Inverse projection, back to degrees.
    pub fn unproject(&self, point: ProjectedPoint) -> GeoPoint {
        let lon = (point.x / self.radius).to_degrees();
        let lat = (2.0 * (point.y / self.radius).exp().atan() - FRAC_PI_2).to_degrees();
        GeoPoint { lon, lat }
    }

    fn check_zoom(&self, zoom: u8) -> Result<(), CoordError> {
        if zoom > self.max_zoom {
            return Err(CoordError::UnsupportedZoom(zoom));
        }
        Ok(())
    }

    /// Returns the tile containing `point` at `zoom`.
    ///
    /// Points beyond the projected square (latitudes past ~85.05°) clamp to
    /// the edge row.
    pub fn tile_for(&self, point: ProjectedPoint, zoom: u8) -> Result<TileId, CoordError> {
        self.check_zoom(zoom)?;

        let span = self.tile_span(zoom);
        let last = f64::from((1u32 << zoom) - 1);
        let col = ((point.x + self.origin_shift()) / span)
            .floor()
            .clamp(0.0, last) as u32;
        let row = ((self.origin_shift() - point.y) / span)
            .floor()
            .clamp(0.0, last) as u32;

        Ok(TileId::new(col, row, zoom))
    }

    /// Returns the projected bounds of a tile.
    pub fn bounds(&self, tile: &TileId) -> BoundingBox {
        let span = self.tile_span(tile.zoom);
        let min_x = -self.origin_shift() + f64::from(tile.col) * span;
        let max_y = self.origin_shift() - f64::from(tile.row) * span;
        BoundingBox {
            min_x,
            min_y: max_y - span,
            max_x: min_x + span,
            max_y,
        }
    }

    /// Geographic center of a tile.
    pub fn tile_center(&self, tile: &TileId) -> GeoPoint {
        let bounds = self.bounds(tile);
        self.unproject(ProjectedPoint {
            x: (bounds.min_x + bounds.max_x) / 2.0,
            y: (bounds.min_y + bounds.max_y) / 2.0,
        })
    }

    /// Returns every tile at `zoom` whose area overlaps `bbox`.
    ///
    /// Overlap must have positive area: a tile that only shares an edge with
    /// the box is not included. Tiles come out in row-major order.
    pub fn tiles_intersecting(
        &self,
        bbox: &BoundingBox,
        zoom: u8,
    ) -> Result<Vec<TileId>, CoordError> {
        self.check_zoom(zoom)?;

        let span = self.tile_span(zoom);
        let last = i64::from((1u32 << zoom) - 1);
        let shift = self.origin_shift();

        let axis_range = |lo: f64, hi: f64| -> Option<(u32, u32)> {
            let first = ((lo / span) + EDGE_EPSILON).floor() as i64;
            let end = ((hi / span) - EDGE_EPSILON).ceil() as i64 - 1;
            let first = first.clamp(0, last);
            let end = end.clamp(0, last);
            if hi - lo <= 0.0 || end < first {
                None
            } else {
                Some((first as u32, end as u32))
            }
        };

        let cols = axis_range(bbox.min_x + shift, bbox.max_x + shift);
        let rows = axis_range(shift - bbox.max_y, shift - bbox.min_y);

        let (Some((col_first, col_end)), Some((row_first, row_end))) = (cols, rows) else {
            return Ok(Vec::new());
        };

        let mut tiles = Vec::with_capacity(
            ((col_end - col_first + 1) as usize) * ((row_end - row_first + 1) as usize),
        );
        for row in row_first..=row_end {
            for col in col_first..=col_end {
                tiles.push(TileId::new(col, row, zoom));
            }
        }
        Ok(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_origin() {
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_project_rejects_antimeridian() {
        let scheme = WebMercator::new();
        for lon in [180.0, -180.0] {
            let result = scheme.project(GeoPoint::new(lon, 0.0));
            assert!(
                matches!(result, Err(CoordError::InvalidCoordinate { .. })),
                "lon {lon}: {result:?}"
            );
        }

        let message = scheme
            .project(GeoPoint::new(180.0, 0.0))
            .unwrap_err()
            .to_string();
        assert!(message.contains("|lon| must be below 180"), "{message}");
    }

    #[test]
    fn test_project_near_antimeridian() {
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(179.999_999, 0.0)).unwrap();
        assert!(p.x < scheme.origin_shift());
        assert!((p.x - scheme.origin_shift()).abs() < 1.0);
    }

    #[test]
    fn test_project_mercator_limit_reaches_edge() {
        // 85.0511287798° is where the projected square ends
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(0.0, 85.051_128_779_8)).unwrap();
        assert!((p.y - scheme.origin_shift()).abs() < 1.0);
    }

    #[test]
    fn test_project_san_francisco() {
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(-122.39599, 37.78858)).unwrap();
        assert!((p.x - -13_625_059.28).abs() < 0.01, "x was {}", p.x);
        assert!((p.y - 4_549_602.16).abs() < 0.01, "y was {}", p.y);
    }

    #[test]
    fn test_reject_both_axes_invalid() {
        let result = WebMercator::new().project(GeoPoint::new(200.0, 100.0));
        assert!(matches!(
            result,
            Err(CoordError::InvalidCoordinate { lon, lat }) if lon == 200.0 && lat == 100.0
        ));
    }

    #[test]
    fn test_reject_longitude_only_invalid() {
        // A single bad axis is enough to reject the point
        let result = WebMercator::new().project(GeoPoint::new(200.0, 45.0));
        assert!(matches!(result, Err(CoordError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_reject_latitude_only_invalid() {
        let result = WebMercator::new().project(GeoPoint::new(10.0, 95.0));
        assert!(matches!(result, Err(CoordError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_reject_pole() {
        let result = WebMercator::new().project(GeoPoint::new(0.0, 90.0));
        assert!(matches!(result, Err(CoordError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_reject_nan() {
        let result = WebMercator::new().project(GeoPoint::new(f64::NAN, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_tile_for_matches_slippy_formula() {
        // New York City: 40.7128°N, 74.0060°W
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(-74.0060, 40.7128)).unwrap();
        let tile = scheme.tile_for(p, 16).unwrap();
        assert_eq!(tile.row, 24640);
        assert_eq!(tile.col, 19295);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_tile_for_unsupported_zoom() {
        let scheme = WebMercator::new().with_max_zoom(19);
        let result = scheme.tile_for(ProjectedPoint::new(0.0, 0.0), 20);
        assert_eq!(result, Err(CoordError::UnsupportedZoom(20)));
    }

    #[test]
    fn test_tile_for_clamps_beyond_extent() {
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(0.0, 89.0)).unwrap();
        let tile = scheme.tile_for(p, 4).unwrap();
        assert_eq!(tile.row, 0);
    }

    #[test]
    fn test_bounds_zoom_zero_is_whole_plane() {
        let scheme = WebMercator::new();
        let b = scheme.bounds(&TileId::new(0, 0, 0));
        assert!((b.min_x + scheme.origin_shift()).abs() < 1e-6);
        assert!((b.max_x - scheme.origin_shift()).abs() < 1e-6);
        assert!((b.min_y + scheme.origin_shift()).abs() < 1e-6);
        assert!((b.max_y - scheme.origin_shift()).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_contains_projected_point() {
        let scheme = WebMercator::new();
        let p = scheme.project(GeoPoint::new(2.3522, 48.8566)).unwrap();
        let tile = scheme.tile_for(p, 12).unwrap();
        assert!(scheme.bounds(&tile).contains(&p));
    }

    #[test]
    fn test_tile_center_roundtrip() {
        let scheme = WebMercator::new();
        let tile = TileId::new(654, 1583, 12);
        let center = scheme.tile_center(&tile);
        let p = scheme.project(center).unwrap();
        assert_eq!(scheme.tile_for(p, 12).unwrap(), tile);
    }

    #[test]
    fn test_tiles_intersecting_exact_tile_gives_children() {
        let scheme = WebMercator::new();
        let parent = TileId::new(163, 395, 10);
        let tiles = scheme.tiles_intersecting(&scheme.bounds(&parent), 12).unwrap();

        assert_eq!(tiles.len(), 16);
        for tile in &tiles {
            assert_eq!(tile.ancestor(10), Some(parent));
        }
    }

    #[test]
    fn test_tiles_intersecting_partial_overlap_counts() {
        let scheme = WebMercator::new();
        let tile = TileId::new(4, 4, 3);
        let b = scheme.bounds(&tile);
        let quarter = b.width() / 4.0;
        // Shift the box a quarter tile east and south: overlaps 2x2 tiles
        let shifted = BoundingBox::new(
            b.min_x + quarter,
            b.min_y - quarter,
            b.max_x + quarter,
            b.max_y - quarter,
        );
        let tiles = scheme.tiles_intersecting(&shifted, 3).unwrap();
        assert_eq!(
            tiles,
            vec![
                TileId::new(4, 4, 3),
                TileId::new(5, 4, 3),
                TileId::new(4, 5, 3),
                TileId::new(5, 5, 3),
            ]
        );
    }

    #[test]
    fn test_tiles_intersecting_degenerate_box_is_empty() {
        let scheme = WebMercator::new();
        let b = BoundingBox::new(10.0, 10.0, 10.0, 20.0);
        assert!(scheme.tiles_intersecting(&b, 5).unwrap().is_empty());
    }

    #[test]
    fn test_custom_tile_size() {
        let scheme = WebMercator::new().with_tile_size(512);
        assert_eq!(scheme.tile_size(), 512);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_project_finite_and_deterministic(
                lon in -179.999..179.999_f64,
                lat in -89.999..89.999_f64
            ) {
                let scheme = WebMercator::new();
                let a = scheme.project(GeoPoint::new(lon, lat))?;
                let b = scheme.project(GeoPoint::new(lon, lat))?;
                prop_assert!(a.x.is_finite() && a.y.is_finite());
                prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
                prop_assert_eq!(a.y.to_bits(), b.y.to_bits());
            }

            #[test]
            fn test_unproject_roundtrip(
                lon in -179.0..179.0_f64,
                lat in -85.0..85.0_f64
            ) {
                let scheme = WebMercator::new();
                let back = scheme.unproject(scheme.project(GeoPoint::new(lon, lat))?);
                prop_assert!((back.lon - lon).abs() < 1e-7);
                prop_assert!((back.lat - lat).abs() < 1e-7);
            }

            #[test]
            fn test_tile_bounds_contain_point(
                lon in -179.9..179.9_f64,
                lat in -85.0..85.0_f64,
                zoom in 0u8..=20
            ) {
                let scheme = WebMercator::new();
                let p = scheme.project(GeoPoint::new(lon, lat))?;
                let tile = scheme.tile_for(p, zoom)?;
                prop_assert!(tile.is_valid());
                prop_assert!(scheme.bounds(&tile).contains(&p));
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -179.9..-90.0_f64,
                lon2 in -80.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                let scheme = WebMercator::new();
                let t1 = scheme.tile_for(scheme.project(GeoPoint::new(lon1, lat))?, zoom)?;
                let t2 = scheme.tile_for(scheme.project(GeoPoint::new(lon2, lat))?, zoom)?;
                prop_assert!(t1.col < t2.col);
            }
        }
    }
}
