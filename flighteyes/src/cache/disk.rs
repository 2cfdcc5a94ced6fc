//! Date-keyed on-disk tile cache.
//!
//! Each tile is stored as `{quadkey}-{YYYY}-{MM}-{DD}.jpeg`. The date is
//! part of the key, so cached imagery is reused within one calendar day and
//! refetched on the next. Files from other days are left alone until
//! [`DailyTileCache::prune_stale`] removes them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::coord::QuadKey;

/// File extension of cached tiles.
pub const CACHE_EXTENSION: &str = "jpeg";

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error on a cache file or directory.
    #[error("Cache I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of removing stale cache files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

/// On-disk tile cache keyed by (quadkey, calendar date).
#[derive(Debug, Clone)]
pub struct DailyTileCache {
    directory: PathBuf,
    date: NaiveDate,
}

impl DailyTileCache {
    /// Creates a cache for the given directory and date.
    ///
    /// The directory is created on first write.
    pub fn new(directory: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            directory: directory.into(),
            date,
        }
    }

    /// Creates a cache keyed on today's local date.
    pub fn for_today(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, Local::now().date_naive())
    }

    /// Returns a copy of this cache keyed on a different date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// File name for a quadkey on a given date.
    pub fn file_name(quadkey: &QuadKey, date: NaiveDate) -> String {
        format!("{}-{}.{}", quadkey, date.format("%Y-%m-%d"), CACHE_EXTENSION)
    }

    /// Parses a cache file name back into its quadkey and date.
    pub fn parse_file_name(name: &str) -> Option<(QuadKey, NaiveDate)> {
        let stem = name.strip_suffix(CACHE_EXTENSION)?.strip_suffix('.')?;
        let mut parts = stem.rsplitn(4, '-');
        let day = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        let quadkey = parts.next()?.parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some((quadkey, date))
    }

    /// Path of the cache entry for `quadkey` on this cache's date.
    pub fn path_for(&self, quadkey: &QuadKey) -> PathBuf {
        self.directory.join(Self::file_name(quadkey, self.date))
    }

    /// Reads a cached tile. Returns `None` on a miss.
    pub fn get(&self, quadkey: &QuadKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(quadkey);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    /// Stores tile bytes verbatim and returns the entry's path.
    pub fn put(&self, quadkey: &QuadKey, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.directory).map_err(|source| CacheError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.path_for(quadkey);
        let partial = path.with_extension("partial");
        fs::write(&partial, bytes)
            .and_then(|_| fs::rename(&partial, &path))
            .map_err(|source| {
                let _ = fs::remove_file(&partial);
                CacheError::Io {
                    path: path.clone(),
                    source,
                }
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Cached tile");
        Ok(path)
    }

    /// Deletes cache entries whose date differs from this cache's date.
    ///
    /// Files that do not look like cache entries are left untouched. A
    /// missing cache directory counts as empty.
    pub fn prune_stale(&self) -> Result<PruneResult, CacheError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PruneResult::default()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.directory.clone(),
                    source,
                })
            }
        };

        let mut result = PruneResult::default();
        for entry in entries {
            let entry = entry.map_err(|source| CacheError::Io {
                path: self.directory.clone(),
                source,
            })?;
            let name = entry.file_name();
            let Some((_, date)) = name.to_str().and_then(Self::parse_file_name) else {
                continue;
            };
            if date == self.date {
                continue;
            }

            let path = entry.path();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path).map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            result.files_deleted += 1;
            result.bytes_freed += size;
        }

        info!(
            directory = %self.directory.display(),
            files = result.files_deleted,
            bytes = result.bytes_freed,
            "Pruned stale tile cache entries"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(s: &str) -> QuadKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_file_name_format() {
        let name = DailyTileCache::file_name(&key("0230102033"), date(2024, 3, 7));
        assert_eq!(name, "0230102033-2024-03-07.jpeg");
    }

    #[test]
    fn test_parse_file_name_roundtrip() {
        let name = DailyTileCache::file_name(&key("0123"), date(2025, 12, 31));
        let (quadkey, parsed) = DailyTileCache::parse_file_name(&name).unwrap();
        assert_eq!(quadkey, key("0123"));
        assert_eq!(parsed, date(2025, 12, 31));
    }

    #[test]
    fn test_parse_rejects_foreign_files() {
        assert!(DailyTileCache::parse_file_name("notes.txt").is_none());
        assert!(DailyTileCache::parse_file_name("0124-2024-01-01.jpeg").is_none());
        assert!(DailyTileCache::parse_file_name("0123-2024-13-01.jpeg").is_none());
        assert!(DailyTileCache::parse_file_name("background.jpeg").is_none());
    }

    #[test]
    fn test_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyTileCache::new(dir.path().join("quads"), date(2024, 1, 1));
        let quadkey = key("0231");

        assert_eq!(cache.get(&quadkey).unwrap(), None);

        let path = cache.put(&quadkey, &[0xFF, 0xD8, 0xFF]).unwrap();
        assert!(path.ends_with("0231-2024-01-01.jpeg"));
        assert_eq!(cache.get(&quadkey).unwrap(), Some(vec![0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_entries_expire_with_date() {
        let dir = tempfile::tempdir().unwrap();
        let yesterday = DailyTileCache::new(dir.path(), date(2024, 1, 1));
        yesterday.put(&key("01"), b"old").unwrap();

        let today = yesterday.clone().with_date(date(2024, 1, 2));
        assert_eq!(today.get(&key("01")).unwrap(), None);
    }

    #[test]
    fn test_prune_stale_keeps_current_day() {
        let dir = tempfile::tempdir().unwrap();
        let old = DailyTileCache::new(dir.path(), date(2024, 1, 1));
        old.put(&key("01"), b"aaaa").unwrap();
        old.put(&key("02"), b"bb").unwrap();

        let current = old.clone().with_date(date(2024, 1, 2));
        current.put(&key("01"), b"new").unwrap();
        fs::write(dir.path().join("README"), b"keep me").unwrap();

        let result = current.prune_stale().unwrap();
        assert_eq!(
            result,
            PruneResult {
                files_deleted: 2,
                bytes_freed: 6
            }
        );
        assert_eq!(current.get(&key("01")).unwrap(), Some(b"new".to_vec()));
        assert!(dir.path().join("README").exists());
    }

    #[test]
    fn test_prune_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyTileCache::new(dir.path().join("absent"), date(2024, 1, 1));
        assert_eq!(cache.prune_stale().unwrap(), PruneResult::default());
    }
}
