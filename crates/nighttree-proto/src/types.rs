//! Base data types shared by the wire protocol and the server state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BlockKind
// ---------------------------------------------------------------------------

/// A terrain/material type occupying one world cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Air,
    Dirt,
    Grass,
    Stone,
    Sand,
    Wood,
    Bedrock,
    Ladder,
}

impl BlockKind {
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Air,
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Stone,
        BlockKind::Sand,
        BlockKind::Wood,
        BlockKind::Bedrock,
        BlockKind::Ladder,
    ];

    /// Wire/storage name of the block.
    pub fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Dirt => "dirt",
            Self::Grass => "grass",
            Self::Stone => "stone",
            Self::Sand => "sand",
            Self::Wood => "wood",
            Self::Bedrock => "bedrock",
            Self::Ladder => "ladder",
        }
    }

    /// Whether a player may break this block.
    pub fn is_breakable(self) -> bool {
        !matches!(self, Self::Air | Self::Bedrock)
    }

    /// Whether a block may be placed into a cell currently holding this kind.
    pub fn is_replaceable(self) -> bool {
        matches!(self, Self::Air | Self::Ladder)
    }

    /// Whether this kind can exist as an item in a hotbar or inventory slot.
    pub fn is_item(self) -> bool {
        self.is_breakable()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown block: {s}"))
    }
}

// ---------------------------------------------------------------------------
// PlayerColor
// ---------------------------------------------------------------------------

/// Body color chosen by a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    #[default]
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
    Pink,
}

impl PlayerColor {
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Cyan => "cyan",
            Self::Pink => "pink",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
