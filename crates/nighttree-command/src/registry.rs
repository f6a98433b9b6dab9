//! Command name to required permission level table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

/// A command the server knows how to run.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinCommand {
    pub name: &'static str,
    pub level: i32,
    pub usage: &'static str,
}

pub const BUILTIN_COMMANDS: &[BuiltinCommand] = &[
    BuiltinCommand { name: "ban", level: 2, usage: "/ban <player_id>" },
    BuiltinCommand { name: "mute", level: 1, usage: "/mute <player_id>" },
    BuiltinCommand { name: "unpunish", level: 2, usage: "/unpunish <player_id>" },
    BuiltinCommand { name: "kick", level: 1, usage: "/kick <player_id>" },
    BuiltinCommand { name: "perms", level: 3, usage: "/perms <player_id> <level>" },
    BuiltinCommand { name: "help", level: 0, usage: "/help" },
    BuiltinCommand { name: "stop", level: 3, usage: "/stop" },
    BuiltinCommand { name: "respawn", level: 0, usage: "/respawn" },
    BuiltinCommand { name: "tp", level: 0, usage: "/tp <player_id>" },
    BuiltinCommand { name: "give", level: 0, usage: "/give [player_id] <block> <quantity>" },
];

/// Look up a built-in command by name.
pub fn builtin(name: &str) -> Option<&'static BuiltinCommand> {
    BUILTIN_COMMANDS.iter().find(|c| c.name == name)
}

/// Required permission level per command. Serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandRegistry {
    levels: BTreeMap<String, i32>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Registry holding every built-in at its default level.
    pub fn new() -> Self {
        Self {
            levels: BUILTIN_COMMANDS
                .iter()
                .map(|c| (c.name.to_string(), c.level))
                .collect(),
        }
    }

    /// Merge a stored table with the built-in set.
    ///
    /// Stored levels win for known commands, names that are no longer
    /// built in are dropped, and missing built-ins get their default level.
    /// Returns the registry and whether anything changed.
    pub fn reconcile(stored: BTreeMap<String, i32>) -> (Self, bool) {
        let mut registry = Self::new();
        let mut changed = false;

        for (name, level) in &stored {
            match registry.levels.get_mut(name) {
                Some(slot) => *slot = *level,
                None => {
                    info!("Dropping stale command entry '{name}'");
                    changed = true;
                }
            }
        }
        for name in registry.levels.keys() {
            if !stored.contains_key(name) {
                info!("Registering command '{name}'");
                changed = true;
            }
        }
        (registry, changed)
    }

    /// Required level for `name`, or `None` if it is not registered.
    pub fn required_level(&self, name: &str) -> Option<i32> {
        self.levels.get(name).copied()
    }

    /// Registered command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
