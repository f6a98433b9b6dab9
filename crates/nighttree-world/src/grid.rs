//! Row-major 2D block grid.
//!
//! Cells are addressed as `(x, y)` with `y` selecting the row. Dimensions are
//! fixed once the grid exists; there is no resize operation.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use nighttree_proto::BlockKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("world grid has no cells")]
    Empty,

    #[error("row {row} has {len} cells, expected {expected}")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// The world map every player observes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Vec<BlockKind>>")]
pub struct WorldGrid {
    width: usize,
    rows: Vec<Vec<BlockKind>>,
}

impl WorldGrid {
    #[cfg(test)]
    /// Create a grid with every cell set to `kind`.
    pub fn filled(width: usize, height: usize, kind: BlockKind) -> Result<Self, GridError> {
        Self::from_rows(vec![vec![kind; width]; height])
    }

    /// Build a grid from rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<BlockKind>>) -> Result<Self, GridError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridError::Ragged {
                row,
                len: r.len(),
                expected: width,
            });
        }
        Ok(Self { width, rows })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Convert signed coordinates to an in-bounds cell index.
    pub fn cell(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.rows.len()).then_some((x, y))
    }

    /// Block at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i64, y: i64) -> Option<BlockKind> {
        let (x, y) = self.cell(x, y)?;
        Some(self.rows[y][x])
    }

    /// Overwrite `(x, y)`. Returns the previous block, or `None` when out of
    /// bounds (in which case nothing changes).
    pub fn set(&mut self, x: i64, y: i64, kind: BlockKind) -> Option<BlockKind> {
        let (x, y) = self.cell(x, y)?;
        Some(std::mem::replace(&mut self.rows[y][x], kind))
    }

    pub fn rows(&self) -> &[Vec<BlockKind>] {
        &self.rows
    }

    pub fn to_rows(&self) -> Vec<Vec<BlockKind>> {
        self.rows.clone()
    }
}

impl TryFrom<Vec<Vec<BlockKind>>> for WorldGrid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<BlockKind>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl Serialize for WorldGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}
