//! Default layered terrain generator.
//!
//! Layout by row (`y` grows downward):
//! - 0..5: air
//! - 5: grass
//! - 6..10: dirt
//! - 10..15: dirt, with sand columns where `x % 7 == 0 || x % 11 == 0`
//! - 15..height-1: stone
//! - everything else (the bottom row of a deep world): dirt

use nighttree_proto::BlockKind;

use crate::grid::{GridError, WorldGrid};

/// Default world width in cells.
pub const DEFAULT_WIDTH: usize = 100;

/// Default world height in cells.
pub const DEFAULT_HEIGHT: usize = 30;

/// Generate a fresh layered world.
pub fn generate_layered(width: usize, height: usize) -> Result<WorldGrid, GridError> {
    let rows = (0..height)
        .map(|y| (0..width).map(|x| layer_block(x, y, height)).collect())
        .collect();
    WorldGrid::from_rows(rows)
}

fn layer_block(x: usize, y: usize, height: usize) -> BlockKind {
    match y {
        0..=4 => BlockKind::Air,
        5 => BlockKind::Grass,
        6..=9 => BlockKind::Dirt,
        10..=14 if x % 7 == 0 || x % 11 == 0 => BlockKind::Sand,
        10..=14 => BlockKind::Dirt,
        _ if y < height - 1 => BlockKind::Stone,
        _ => BlockKind::Dirt,
    }
}
