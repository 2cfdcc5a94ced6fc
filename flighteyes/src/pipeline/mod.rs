//! End-to-end mosaic pipeline.
//!
//! ```text
//! GeoPoint ──► project ──► zoom_for_altitude ──► cover ──► to_grid ──► composite ──► file
//!             (coord)       (coord::zoom)      (coverage)   (grid)      (mosaic)
//! ```
//!
//! [`Pipeline::plan`] runs the pure stages and returns a [`MosaicPlan`];
//! [`Pipeline::render`] fetches and writes the tiles of a plan. Errors keep
//! the input point and zoom so a failure can be traced back to its input.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::coord::{zoom_for_altitude, CoordError, GeoPoint, ProjectedPoint, WebMercator};
use crate::coverage::Coverage;
use crate::grid::{to_grid, GridError, TileMatrix};
use crate::mosaic::{FetchMode, Mosaic, MosaicCompositor, MosaicError, ProgressObserver, TileSource};

/// A pipeline failure, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot project {point}: {source}")]
    Projection {
        point: GeoPoint,
        #[source]
        source: CoordError,
    },

    #[error("Cannot pick a zoom level for altitude {altitude}: {source}")]
    Zoom {
        altitude: f64,
        #[source]
        source: CoordError,
    },

    #[error("Cannot cover {point} at zoom {zoom}: {source}")]
    Coverage {
        point: GeoPoint,
        zoom: u8,
        #[source]
        source: CoordError,
    },

    #[error("Cannot arrange tiles around {point} at zoom {zoom}: {source}")]
    Grid {
        point: GeoPoint,
        zoom: u8,
        #[source]
        source: GridError,
    },

    #[error("Cannot build mosaic around {point} at zoom {zoom}: {source}")]
    Mosaic {
        point: GeoPoint,
        zoom: u8,
        #[source]
        source: MosaicError,
    },
}

/// Everything computed before any tile is fetched.
#[derive(Debug, Clone)]
pub struct MosaicPlan {
    pub point: GeoPoint,
    pub projected: ProjectedPoint,
    pub altitude: f64,
    /// Zoom chosen from the altitude. Tiles in `matrix` are finer.
    pub zoom: u8,
    pub matrix: TileMatrix,
}

impl MosaicPlan {
    /// Output size in pixels for square tiles of `tile_size`.
    pub fn dimensions(&self, tile_size: u32) -> (u32, u32) {
        (
            self.matrix.col_count() as u32 * tile_size,
            self.matrix.row_count() as u32 * tile_size,
        )
    }
}

impl fmt::Display for MosaicPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} m: zoom {}, {}×{} tiles at zoom {}",
            self.point,
            self.altitude,
            self.zoom,
            self.matrix.col_count(),
            self.matrix.row_count(),
            self.matrix.zoom()
        )
    }
}

/// Runs the stages with one tile scheme and one compositor.
#[derive(Clone)]
pub struct Pipeline {
    scheme: WebMercator,
    coverage: Coverage,
    compositor: MosaicCompositor,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(WebMercator::default())
    }
}

impl Pipeline {
    pub fn new(scheme: WebMercator) -> Self {
        Self {
            scheme,
            coverage: Coverage::new(scheme),
            compositor: MosaicCompositor::new(scheme.tile_size()),
        }
    }

    /// Overrides how many zoom levels below the selected zoom tiles are fetched.
    pub fn with_refinement(mut self, refinement: u8) -> Self {
        self.coverage = self.coverage.with_refinement(refinement);
        self
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.compositor = self.compositor.with_fetch_mode(fetch_mode);
        self
    }

    pub fn with_progress(mut self, progress: std::sync::Arc<dyn ProgressObserver>) -> Self {
        self.compositor = self.compositor.with_progress(progress);
        self
    }

    pub fn scheme(&self) -> &WebMercator {
        &self.scheme
    }

    /// Projects the point, picks the zoom and arranges the covering tiles.
    pub fn plan(&self, point: GeoPoint, altitude: f64) -> Result<MosaicPlan, PipelineError> {
        let projected = self
            .scheme
            .project(point)
            .map_err(|source| PipelineError::Projection { point, source })?;

        let zoom = zoom_for_altitude(altitude, &self.scheme)
            .map_err(|source| PipelineError::Zoom { altitude, source })?;

        let tiles = self
            .coverage
            .cover(projected, zoom)
            .map_err(|source| PipelineError::Coverage {
                point,
                zoom,
                source,
            })?;

        let matrix = to_grid(tiles).map_err(|source| PipelineError::Grid {
            point,
            zoom,
            source,
        })?;

        let plan = MosaicPlan {
            point,
            projected,
            altitude,
            zoom,
            matrix,
        };
        info!(plan = %plan, "Planned mosaic");
        Ok(plan)
    }

    /// Fetches every tile of the plan and writes the mosaic to `output`.
    pub fn render(
        &self,
        plan: &MosaicPlan,
        source: &dyn TileSource,
        output: &Path,
    ) -> Result<Mosaic, PipelineError> {
        self.compositor
            .composite(&plan.matrix, source, output)
            .map_err(|source| PipelineError::Mosaic {
                point: plan.point,
                zoom: plan.zoom,
                source,
            })
    }

    /// [`plan`](Self::plan) followed by [`render`](Self::render).
    pub fn run(
        &self,
        point: GeoPoint,
        altitude: f64,
        source: &dyn TileSource,
        output: &Path,
    ) -> Result<(MosaicPlan, Mosaic), PipelineError> {
        let plan = self.plan(point, altitude)?;
        let mosaic = self.render(&plan, source, output)?;
        Ok((plan, mosaic))
    }
}
