//! Bing Maps quadkey encoding.
//!
//! A quadkey interleaves the bits of a tile's column and row, one base-4
//! digit per zoom level, most significant level first. Its length equals
//! the zoom level, so zoom 0 is the empty key.

use std::fmt;
use std::str::FromStr;

use super::types::{CoordError, TileId, MAX_ZOOM};

/// String identity of a tile, used for cache file names and provider URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadKey(String);

impl QuadKey {
    /// Returns the quadkey as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Zoom level encoded by this quadkey.
    pub fn zoom(&self) -> u8 {
        self.0.len() as u8
    }

    /// Decodes the quadkey back into a tile identifier.
    pub fn to_tile(&self) -> TileId {
        let zoom = self.zoom();
        let mut col = 0u32;
        let mut row = 0u32;
        for (i, digit) in self.0.bytes().enumerate() {
            let mask = 1u32 << (zoom as usize - 1 - i);
            let value = digit - b'0';
            if value & 1 != 0 {
                col |= mask;
            }
            if value & 2 != 0 {
                row |= mask;
            }
        }
        TileId::new(col, row, zoom)
    }
}

impl From<&TileId> for QuadKey {
    fn from(tile: &TileId) -> Self {
        let mut key = String::with_capacity(tile.zoom as usize);
        for level in (1..=tile.zoom).rev() {
            let mask = 1u32 << (level - 1);
            let mut digit = b'0';
            if tile.col & mask != 0 {
                digit += 1;
            }
            if tile.row & mask != 0 {
                digit += 2;
            }
            key.push(digit as char);
        }
        QuadKey(key)
    }
}

impl FromStr for QuadKey {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_ZOOM as usize || !s.bytes().all(|b| (b'0'..=b'3').contains(&b)) {
            return Err(CoordError::InvalidQuadkey(s.to_string()));
        }
        Ok(QuadKey(s.to_string()))
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TileId {
    /// Returns the quadkey for this tile.
    pub fn quadkey(&self) -> QuadKey {
        QuadKey::from(self)
    }

    /// Parses a quadkey string into a tile identifier.
    pub fn from_quadkey(quadkey: &str) -> Result<TileId, CoordError> {
        quadkey.parse::<QuadKey>().map(|q| q.to_tile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_quadkey() {
        // Example from the Bing Maps tile system documentation
        let tile = TileId::new(3, 5, 3);
        assert_eq!(tile.quadkey().as_str(), "213");
    }

    #[test]
    fn test_zoom_zero_is_empty() {
        let tile = TileId::new(0, 0, 0);
        assert_eq!(tile.quadkey().as_str(), "");
        assert_eq!(TileId::from_quadkey("").unwrap(), tile);
    }

    #[test]
    fn test_first_level_quadrants() {
        assert_eq!(TileId::new(0, 0, 1).quadkey().as_str(), "0");
        assert_eq!(TileId::new(1, 0, 1).quadkey().as_str(), "1");
        assert_eq!(TileId::new(0, 1, 1).quadkey().as_str(), "2");
        assert_eq!(TileId::new(1, 1, 1).quadkey().as_str(), "3");
    }

    #[test]
    fn test_decode_known_quadkey() {
        let tile = TileId::from_quadkey("213").unwrap();
        assert_eq!(tile, TileId::new(3, 5, 3));
    }

    #[test]
    fn test_reject_invalid_digit() {
        let result = TileId::from_quadkey("0124");
        assert!(matches!(result, Err(CoordError::InvalidQuadkey(_))));
    }

    #[test]
    fn test_reject_too_long() {
        let key = "0".repeat(MAX_ZOOM as usize + 1);
        assert!(key.parse::<QuadKey>().is_err());
    }

    #[test]
    fn test_length_matches_zoom() {
        let tile = TileId::new(654, 1583, 12);
        let quadkey = tile.quadkey();
        assert_eq!(quadkey.zoom(), 12);
        assert_eq!(quadkey.as_str().len(), 12);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_quadkey_roundtrip(
                zoom in 0u8..=MAX_ZOOM,
                col_raw in any::<u32>(),
                row_raw in any::<u32>()
            ) {
                let n = 1u32 << zoom;
                let tile = TileId::new(col_raw % n, row_raw % n, zoom);
                let decoded = TileId::from_quadkey(tile.quadkey().as_str())?;
                prop_assert_eq!(decoded, tile);
            }

            #[test]
            fn test_parent_is_prefix(
                zoom in 1u8..=MAX_ZOOM,
                col_raw in any::<u32>(),
                row_raw in any::<u32>()
            ) {
                let n = 1u32 << zoom;
                let tile = TileId::new(col_raw % n, row_raw % n, zoom);
                let parent = tile.ancestor(zoom - 1).unwrap();
                let key = tile.quadkey();
                let parent_key = parent.quadkey();
                prop_assert!(key.as_str().starts_with(parent_key.as_str()));
            }
        }
    }
}
