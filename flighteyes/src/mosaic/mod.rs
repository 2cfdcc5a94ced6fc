//! Mosaic composition.
//!
//! Fetches the image for every cell of a [`TileMatrix`](crate::grid::TileMatrix)
//! from a [`TileSource`] and copies it into one canvas. Any fetch failure
//! aborts the whole mosaic.

mod compositor;
mod source;

pub use compositor::{FetchMode, Mosaic, MosaicCompositor, MosaicError, ProgressObserver};
pub use source::{TileSource, TileSourceError};
