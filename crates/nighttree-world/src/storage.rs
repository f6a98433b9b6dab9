//! JSON file storage for the world grid.
//!
//! The whole grid is rewritten on every save. There is no journaling or
//! partial-write protection.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::generator::generate_layered;
use crate::grid::{GridError, WorldGrid};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid world dimensions: {0}")]
    Grid(#[from] GridError),
}

/// Read a grid from `path`. Returns `Ok(None)` if the file does not exist.
pub fn load_grid(path: &Path) -> Result<Option<WorldGrid>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write the full grid to `path`, creating parent directories as needed.
pub fn save_grid(path: &Path, grid: &WorldGrid) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(grid)?)?;
    Ok(())
}

/// Load the grid at `path`, or generate and save a new one.
pub fn load_or_generate(
    path: &Path,
    width: usize,
    height: usize,
) -> Result<WorldGrid, StorageError> {
    if let Some(grid) = load_grid(path)? {
        info!(
            "Loaded world {} ({}x{})",
            path.display(),
            grid.width(),
            grid.height()
        );
        return Ok(grid);
    }
    let grid = generate_layered(width, height)?;
    save_grid(path, &grid)?;
    info!("Created new world at {} ({width}x{height})", path.display());
    Ok(grid)
}
