//! Tile caching.
//!
//! Downloaded tiles are kept on disk under a name that embeds the current
//! date, so imagery is refreshed once per day. [`CachedTileSource`] puts the
//! cache in front of a [`Provider`](crate::provider::Provider).

mod disk;
mod source;

pub use disk::{CacheError, DailyTileCache, PruneResult, CACHE_EXTENSION};
pub use source::CachedTileSource;

use std::path::PathBuf;

/// Default cache directory: `<platform cache dir>/flighteyes/quads`.
///
/// Returns `None` when the platform has no cache directory.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("flighteyes").join("quads"))
}
