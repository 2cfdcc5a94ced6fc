//! Arranges a set of tiles into a rectangular matrix.
//!
//! Grid construction is two-pass: the tile set is first checked for a
//! complete rectangle (equal column heights, contiguous rows and columns,
//! no holes), then every cell is filled by explicit `(col, row)` lookup.
//! The input order does not matter.
//!
//! Matrix rows follow tile rows from north to south; matrix columns follow
//! tile columns from west to east.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::coord::{QuadKey, TileId};

/// Why a tile set does not form a rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Irregularity {
    /// A column holds a different number of tiles than the first column.
    ColumnHeight {
        col: u32,
        expected: usize,
        actual: usize,
    },
    /// Columns are not consecutive.
    ColumnGap { after: u32 },
    /// Rows are not consecutive.
    RowGap { after: u32 },
    /// A cell inside the rectangle has no tile.
    MissingTile { col: u32, row: u32 },
}

impl fmt::Display for Irregularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Irregularity::ColumnHeight {
                col,
                expected,
                actual,
            } => write!(
                f,
                "column {} has {} tiles, expected {}",
                col, actual, expected
            ),
            Irregularity::ColumnGap { after } => write!(f, "gap after column {}", after),
            Irregularity::RowGap { after } => write!(f, "gap after row {}", after),
            Irregularity::MissingTile { col, row } => {
                write!(f, "no tile at column {}, row {}", col, row)
            }
        }
    }
}

/// Errors that can occur while organizing tiles into a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// No tiles were given.
    #[error("Tile coverage is empty")]
    EmptyCoverage,

    /// Tiles from more than one zoom level were given.
    #[error("Tile coverage mixes zoom levels {expected} and {found}")]
    MixedZoom { expected: u8, found: u8 },

    /// The tiles do not form a complete rectangle.
    #[error("Irregular tile coverage: {0}")]
    IrregularCoverage(Irregularity),
}

/// Rectangular arrangement of tiles.
///
/// Every row has the same length and the matrix is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMatrix {
    rows: Vec<Vec<TileId>>,
}

impl TileMatrix {
    pub fn rows(&self) -> &[Vec<TileId>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.row_count() * self.col_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zoom level shared by every tile.
    pub fn zoom(&self) -> u8 {
        self.rows[0][0].zoom
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&TileId> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterates `(row, col, tile)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &TileId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, tile)| (r, c, tile))
        })
    }

    /// The matrix with every tile replaced by its quadkey.
    pub fn quadkeys(&self) -> Vec<Vec<QuadKey>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(TileId::quadkey).collect())
            .collect()
    }
}

impl fmt::Display for TileMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let keys: Vec<String> = row.iter().map(|t| t.quadkey().to_string()).collect();
            write!(f, "{}", keys.join("|"))?;
        }
        Ok(())
    }
}

fn check_contiguous(
    keys: impl IntoIterator<Item = u32>,
    gap: impl Fn(u32) -> Irregularity,
) -> Result<(), GridError> {
    let mut previous: Option<u32> = None;
    for key in keys {
        if let Some(prev) = previous {
            if key != prev + 1 {
                return Err(GridError::IrregularCoverage(gap(prev)));
            }
        }
        previous = Some(key);
    }
    Ok(())
}

/// Organizes tiles into a [`TileMatrix`].
///
/// Duplicate tiles collapse into one cell.
///
/// # Errors
///
/// - `GridError::EmptyCoverage` if `tiles` is empty
/// - `GridError::MixedZoom` if tiles come from different zoom levels
/// - `GridError::IrregularCoverage` if the tiles are not a full rectangle
pub fn to_grid<I>(tiles: I) -> Result<TileMatrix, GridError>
where
    I: IntoIterator<Item = TileId>,
{
    // Pass 1: index by (col, row) and validate the shape
    let mut cells: BTreeMap<(u32, u32), TileId> = BTreeMap::new();
    let mut zoom: Option<u8> = None;
    for tile in tiles {
        match zoom {
            None => zoom = Some(tile.zoom),
            Some(expected) if expected != tile.zoom => {
                return Err(GridError::MixedZoom {
                    expected,
                    found: tile.zoom,
                });
            }
            Some(_) => {}
        }
        cells.insert((tile.col, tile.row), tile);
    }

    if cells.is_empty() {
        return Err(GridError::EmptyCoverage);
    }

    let mut column_heights: BTreeMap<u32, usize> = BTreeMap::new();
    for &(col, _) in cells.keys() {
        *column_heights.entry(col).or_default() += 1;
    }

    let pivot = *column_heights.values().next().unwrap_or(&0);
    if let Some((&col, &actual)) = column_heights.iter().find(|(_, h)| **h != pivot) {
        return Err(GridError::IrregularCoverage(Irregularity::ColumnHeight {
            col,
            expected: pivot,
            actual,
        }));
    }

    let col_keys: Vec<u32> = column_heights.keys().copied().collect();
    let row_keys: BTreeSet<u32> = cells.keys().map(|&(_, row)| row).collect();

    check_contiguous(col_keys.iter().copied(), |after| Irregularity::ColumnGap {
        after,
    })?;
    check_contiguous(row_keys.iter().copied(), |after| Irregularity::RowGap { after })?;

    // Pass 2: explicit lookup for every cell
    let rows = row_keys
        .iter()
        .map(|&row| {
            col_keys
                .iter()
                .map(|&col| {
                    cells.get(&(col, row)).copied().ok_or(GridError::IrregularCoverage(
                        Irregularity::MissingTile { col, row },
                    ))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TileMatrix { rows })
}
