//! World grid and player record persistence.
//!
//! Every file is rewritten in full on each save. Save failures are logged
//! and never stop the server.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use nighttree_game::PlayerInventory;
use nighttree_proto::PlayerColor;
use nighttree_world::storage::{load_or_generate, save_grid, StorageError};
use nighttree_world::WorldGrid;

/// Where new players appear and `/respawn` sends them.
pub const SPAWN: (f64, f64) = (10.0, 3.0);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("world storage: {0}")]
    World(#[from] StorageError),
}

/// Read and parse `path`. Returns `Ok(None)` if it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Serialize `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    fs::write(path, json)?;
    Ok(())
}

/// Load a table, falling back to its default if the file is missing or bad.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => {
            info!("Loaded {}", path.display());
            value
        }
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to load {}: {e}", path.display());
            T::default()
        }
    }
}

/// Write a table, logging on failure.
pub fn save_or_warn<T: Serialize>(path: &Path, value: &T, pretty: bool) {
    if let Err(e) = write_json(path, value, pretty) {
        warn!("Failed to write {}: {e}", path.display());
    }
}

/// Durable per-player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub items: PlayerInventory,
    #[serde(default)]
    pub color: PlayerColor,
}

impl PlayerRecord {
    /// A first-time player at spawn with the starter loadout.
    pub fn new(color: PlayerColor) -> Self {
        Self {
            x: SPAWN.0,
            y: SPAWN.1,
            items: PlayerInventory::starter(),
            color,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, (x, y): (f64, f64)) {
        self.x = x;
        self.y = y;
    }
}

/// The world grid plus every player record, stored under
/// `<storage>/worlds/<name>/`.
#[derive(Debug)]
pub struct WorldStore {
    world_path: PathBuf,
    players_path: PathBuf,
    pub grid: WorldGrid,
    pub players: BTreeMap<String, PlayerRecord>,
}

impl WorldStore {
    /// Load the named world, generating a `width` x `height` grid if none
    /// exists yet.
    pub fn open(
        storage_dir: &Path,
        name: &str,
        width: usize,
        height: usize,
    ) -> Result<Self, StoreError> {
        let dir = storage_dir.join("worlds").join(name);
        let world_path = dir.join("world.json");
        let players_path = dir.join("players.json");

        let grid = load_or_generate(&world_path, width, height)?;
        let players: BTreeMap<String, PlayerRecord> = read_json(&players_path)?.unwrap_or_default();
        info!("Loaded {} player records", players.len());

        Ok(Self {
            world_path,
            players_path,
            grid,
            players,
        })
    }

    pub fn save_world(&self) {
        if let Err(e) = save_grid(&self.world_path, &self.grid) {
            warn!("Failed to save world {}: {e}", self.world_path.display());
        }
    }

    pub fn save_players(&self) {
        save_or_warn(&self.players_path, &self.players, false);
    }

    #[cfg(test)]
    pub fn world_path(&self) -> &Path {
        &self.world_path
    }

    #[cfg(test)]
    pub fn players_path(&self) -> &Path {
        &self.players_path
    }
}
