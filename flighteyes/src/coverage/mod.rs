//! Tile coverage around a projected point.
//!
//! The covered area is the single tile containing the point at the
//! requested zoom. That area is then filled with tiles
//! [`ZOOM_REFINEMENT`] levels finer, which gives a 4×4 block of imagery
//! at twice the linear resolution of two levels up.
//!
//! ```text
//!   zoom z               zoom z + 2
//! ┌─────────┐        ┌──┬──┬──┬──┐
//! │         │        ├──┼──┼──┼──┤
//! │    •    │  ───►  ├──┼──•──┼──┤
//! │         │        ├──┼──┼──┼──┤
//! └─────────┘        └──┴──┴──┴──┘
//! ```

use tracing::debug;

use crate::coord::{CoordError, ProjectedPoint, TileId, WebMercator};

/// Number of zoom levels between the center tile and the tiles that cover
/// it. Fixed policy; override with [`Coverage::with_refinement`].
pub const ZOOM_REFINEMENT: u8 = 2;

/// Coverage finder bound to a tile scheme.
#[derive(Debug, Clone, Copy)]
pub struct Coverage {
    scheme: WebMercator,
    refinement: u8,
}

impl Coverage {
    /// Creates a coverage finder with the default refinement.
    pub fn new(scheme: WebMercator) -> Self {
        Self {
            scheme,
            refinement: ZOOM_REFINEMENT,
        }
    }

    /// Overrides the refinement offset.
    pub fn with_refinement(mut self, refinement: u8) -> Self {
        self.refinement = refinement;
        self
    }

    pub fn refinement(&self) -> u8 {
        self.refinement
    }

    pub fn scheme(&self) -> &WebMercator {
        &self.scheme
    }

    /// Zoom level of the tiles returned by [`cover`](Self::cover).
    pub fn refined_zoom(&self, zoom: u8) -> Result<u8, CoordError> {
        if zoom > self.scheme.max_zoom() {
            return Err(CoordError::UnsupportedZoom(zoom));
        }
        match zoom.checked_add(self.refinement) {
            Some(refined) if refined <= self.scheme.max_zoom() => Ok(refined),
            Some(refined) => Err(CoordError::UnsupportedZoom(refined)),
            None => Err(CoordError::UnsupportedZoom(u8::MAX)),
        }
    }

    /// Returns the tiles covering the tile that contains `point` at `zoom`.
    ///
    /// The result is never empty for a supported zoom and is sorted in
    /// row-major order.
    ///
    /// # Errors
    ///
    /// `CoordError::UnsupportedZoom` when `zoom` or the refined zoom exceeds
    /// the scheme's maximum.
    pub fn cover(&self, point: ProjectedPoint, zoom: u8) -> Result<Vec<TileId>, CoordError> {
        let refined = self.refined_zoom(zoom)?;
        let center = self.scheme.tile_for(point, zoom)?;
        let bounds = self.scheme.bounds(&center);
        let tiles = self.scheme.tiles_intersecting(&bounds, refined)?;

        debug!(
            center = %center,
            quadkey = %center.quadkey(),
            refined_zoom = refined,
            tiles = tiles.len(),
            "Computed tile coverage"
        );

        Ok(tiles)
    }
}

/// Covers `point` at `zoom` using the default refinement.
pub fn cover(
    point: ProjectedPoint,
    zoom: u8,
    scheme: &WebMercator,
) -> Result<Vec<TileId>, CoordError> {
    Coverage::new(*scheme).cover(point, zoom)
}
