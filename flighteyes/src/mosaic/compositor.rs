//! Stitches a tile matrix into one image.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{ImageFormat, RgbImage};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::source::{TileSource, TileSourceError};
use crate::coord::{QuadKey, TileId, DEFAULT_TILE_SIZE};
use crate::grid::TileMatrix;

/// Errors that can occur while building or writing a mosaic.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// A tile could not be fetched; the whole mosaic is abandoned.
    #[error("Failed to fetch tile {tile} (quadkey {quadkey}): {source}")]
    TileFetchFailed {
        tile: TileId,
        quadkey: QuadKey,
        #[source]
        source: TileSourceError,
    },

    /// A fetched tile does not have the expected pixel size.
    #[error("Tile {tile} is {width}×{height}, expected {expected}×{expected}")]
    TileSizeMismatch {
        tile: TileId,
        expected: u32,
        width: u32,
        height: u32,
    },

    /// The fetch worker pool could not be created.
    #[error("Failed to start fetch workers: {0}")]
    WorkerPool(String),

    /// Encoding the output image failed.
    #[error("Failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem error while writing the output.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How tiles are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One tile at a time, in row-major order.
    #[default]
    Sequential,
    /// Up to `workers` tiles at once. The first failure stops the rest.
    Parallel { workers: usize },
}

/// Receives fetch progress.
pub trait ProgressObserver: Send + Sync {
    /// Called after each tile is fetched.
    fn tile_fetched(&self, done: usize, total: usize);
}

/// A stitched image together with its grid shape.
#[derive(Debug, Clone)]
pub struct Mosaic {
    image: RgbImage,
    rows: usize,
    cols: usize,
    tile_size: u32,
}

impl Mosaic {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Writes the mosaic to `path`, choosing the format from its extension.
    ///
    /// The image is encoded to a temporary file next to `path` and renamed
    /// into place, so a failed write never leaves a partial mosaic.
    pub fn save(&self, path: &Path) -> Result<(), MosaicError> {
        let format = ImageFormat::from_path(path).map_err(|source| MosaicError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MosaicError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mosaic".to_string());
        let partial = path.with_file_name(format!(".{}.partial", file_name));

        if let Err(source) = self.image.save_with_format(&partial, format) {
            let _ = fs::remove_file(&partial);
            return Err(MosaicError::Encode {
                path: path.to_path_buf(),
                source,
            });
        }

        fs::rename(&partial, path).map_err(|source| {
            let _ = fs::remove_file(&partial);
            MosaicError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!(
            path = %path.display(),
            width = self.width(),
            height = self.height(),
            "Mosaic written"
        );
        Ok(())
    }
}

/// Builds mosaics from tile matrices.
#[derive(Clone)]
pub struct MosaicCompositor {
    tile_size: u32,
    fetch_mode: FetchMode,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl Default for MosaicCompositor {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl MosaicCompositor {
    /// Creates a sequential compositor for square tiles of `tile_size` pixels.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            fetch_mode: FetchMode::Sequential,
            progress: None,
        }
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Fetches every tile and stitches them into one image.
    ///
    /// The cell at matrix position `(r, c)` lands at pixel offset
    /// `(c × tile_size, r × tile_size)`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch failure as `MosaicError::TileFetchFailed`.
    pub fn compose(
        &self,
        matrix: &TileMatrix,
        source: &dyn TileSource,
    ) -> Result<Mosaic, MosaicError> {
        let rows = matrix.row_count();
        let cols = matrix.col_count();
        let width = cols as u32 * self.tile_size;
        let height = rows as u32 * self.tile_size;

        info!(
            rows,
            cols,
            width,
            height,
            mode = ?self.fetch_mode,
            "Composing mosaic"
        );

        let mut canvas = RgbImage::new(width, height);
        let counter = AtomicUsize::new(0);
        let total = matrix.len();

        match self.fetch_mode {
            FetchMode::Sequential => {
                for (r, c, tile) in matrix.iter_cells() {
                    let image = self.fetch_tile(source, tile, &counter, total)?;
                    self.place(&mut canvas, &image, r, c);
                }
            }
            FetchMode::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .build()
                    .map_err(|e| MosaicError::WorkerPool(e.to_string()))?;

                let cells: Vec<(usize, usize, TileId)> =
                    matrix.iter_cells().map(|(r, c, t)| (r, c, *t)).collect();

                let fetched = pool.install(|| {
                    cells
                        .par_iter()
                        .map(|(r, c, tile)| {
                            self.fetch_tile(source, tile, &counter, total)
                                .map(|image| (*r, *c, image))
                        })
                        .collect::<Result<Vec<_>, _>>()
                })?;

                for (r, c, image) in &fetched {
                    self.place(&mut canvas, image, *r, *c);
                }
            }
        }

        Ok(Mosaic {
            image: canvas,
            rows,
            cols,
            tile_size: self.tile_size,
        })
    }

    /// Composes the mosaic and writes it to `path`.
    ///
    /// Nothing is written if any tile fails.
    pub fn composite(
        &self,
        matrix: &TileMatrix,
        source: &dyn TileSource,
        path: &Path,
    ) -> Result<Mosaic, MosaicError> {
        let mosaic = self.compose(matrix, source)?;
        mosaic.save(path)?;
        Ok(mosaic)
    }

    fn fetch_tile(
        &self,
        source: &dyn TileSource,
        tile: &TileId,
        counter: &AtomicUsize,
        total: usize,
    ) -> Result<RgbImage, MosaicError> {
        let image = source
            .fetch(tile)
            .map_err(|err| MosaicError::TileFetchFailed {
                tile: *tile,
                quadkey: tile.quadkey(),
                source: err,
            })?;

        if image.width() != self.tile_size || image.height() != self.tile_size {
            return Err(MosaicError::TileSizeMismatch {
                tile: *tile,
                expected: self.tile_size,
                width: image.width(),
                height: image.height(),
            });
        }

        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(tile = %tile, done, total, "Tile fetched");
        if let Some(progress) = &self.progress {
            progress.tile_fetched(done, total);
        }
        Ok(image)
    }

    fn place(&self, canvas: &mut RgbImage, image: &RgbImage, row: usize, col: usize) {
        let x = col as i64 * i64::from(self.tile_size);
        let y = row as i64 * i64::from(self.tile_size);
        image::imageops::replace(canvas, image, x, y);
    }
}
