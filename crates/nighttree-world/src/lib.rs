//! The shared 2D block world: grid storage, generation, and persistence.

pub mod generator;
pub mod grid;
pub mod storage;

pub use grid::{GridError, WorldGrid};
