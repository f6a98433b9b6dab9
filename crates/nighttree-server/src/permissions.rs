//! Permission levels, the blacklist, and command levels.
//!
//! Persists data as JSON files in the storage directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use nighttree_command::CommandRegistry;

use crate::persistence::{load_or_default, save_or_warn};

const PERMISSION_FILE: &str = "permission.json";
const BLACKLIST_FILE: &str = "blacklist.json";
const COMMANDS_FILE: &str = "commands.json";

/// A blacklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Punishment {
    Banned,
    Muted,
}

/// Manages permission levels, punishments and command levels.
pub struct PermissionManager {
    dir: PathBuf,
    /// Player id to permission level. Missing ids are level 0.
    pub levels: BTreeMap<String, i32>,
    pub blacklist: BTreeMap<String, Punishment>,
    pub commands: CommandRegistry,
}

impl PermissionManager {
    /// Load all tables from `dir`, reconciling the command table with the
    /// built-in commands.
    pub fn load(dir: &Path) -> Self {
        let stored: BTreeMap<String, i32> = load_or_default(&dir.join(COMMANDS_FILE));
        let (commands, changed) = CommandRegistry::reconcile(stored);

        let manager = Self {
            dir: dir.to_path_buf(),
            levels: load_or_default(&dir.join(PERMISSION_FILE)),
            blacklist: load_or_default(&dir.join(BLACKLIST_FILE)),
            commands,
        };
        if changed {
            manager.save_commands();
        }
        info!(
            "{} permission entries, {} blacklist entries, {} commands",
            manager.levels.len(),
            manager.blacklist.len(),
            manager.commands.len()
        );
        manager
    }

    pub fn level(&self, id: &str) -> i32 {
        self.levels.get(id).copied().unwrap_or(0)
    }

    pub fn set_level(&mut self, id: &str, level: i32) {
        self.levels.insert(id.to_string(), level);
        self.save_levels();
    }

    pub fn is_banned(&self, id: &str) -> bool {
        self.blacklist.get(id) == Some(&Punishment::Banned)
    }

    pub fn is_muted(&self, id: &str) -> bool {
        self.blacklist.get(id) == Some(&Punishment::Muted)
    }

    /// Record a punishment, replacing any previous one.
    pub fn punish(&mut self, id: &str, punishment: Punishment) {
        self.blacklist.insert(id.to_string(), punishment);
        self.save_blacklist();
    }

    /// Clear any punishment. Returns whether there was one.
    pub fn unpunish(&mut self, id: &str) -> bool {
        let removed = self.blacklist.remove(id).is_some();
        if removed {
            self.save_blacklist();
        }
        removed
    }

    pub fn save_levels(&self) {
        save_or_warn(&self.dir.join(PERMISSION_FILE), &self.levels, true);
    }

    pub fn save_blacklist(&self) {
        save_or_warn(&self.dir.join(BLACKLIST_FILE), &self.blacklist, true);
    }

    pub fn save_commands(&self) {
        save_or_warn(&self.dir.join(COMMANDS_FILE), &self.commands, true);
    }

    pub fn save_all(&self) {
        self.save_levels();
        self.save_blacklist();
        self.save_commands();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nighttree_perm_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_empty_creates_defaults() {
        let dir = temp_dir("empty");
        let pm = PermissionManager::load(&dir);
        assert!(pm.levels.is_empty());
        assert!(pm.blacklist.is_empty());
        assert_eq!(pm.commands.required_level("ban"), Some(2));
        // The reconciled command table is written out on first start.
        assert!(dir.join(COMMANDS_FILE).exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn levels_default_to_zero_and_persist() {
        let dir = temp_dir("levels");
        let mut pm = PermissionManager::load(&dir);
        assert_eq!(pm.level("alice"), 0);
        pm.set_level("alice", 3);

        let pm2 = PermissionManager::load(&dir);
        assert_eq!(pm2.level("alice"), 3);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn blacklist_round_trip() {
        let dir = temp_dir("blacklist");
        let mut pm = PermissionManager::load(&dir);
        pm.punish("troll", Punishment::Banned);
        pm.punish("loud", Punishment::Muted);

        let contents = fs::read_to_string(dir.join(BLACKLIST_FILE)).unwrap();
        assert!(contents.contains("\"banned\""));

        let mut pm2 = PermissionManager::load(&dir);
        assert!(pm2.is_banned("troll"));
        assert!(!pm2.is_muted("troll"));
        assert!(pm2.is_muted("loud"));

        assert!(pm2.unpunish("troll"));
        assert!(!pm2.unpunish("troll"));
        assert!(!PermissionManager::load(&dir).is_banned("troll"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn custom_command_levels_survive_reload() {
        let dir = temp_dir("commands");
        fs::write(
            dir.join(COMMANDS_FILE),
            r#"{"give": 3, "fly": 0}"#,
        )
        .unwrap();
        let pm = PermissionManager::load(&dir);
        assert_eq!(pm.commands.required_level("give"), Some(3));
        assert_eq!(pm.commands.required_level("fly"), None);

        let rewritten = fs::read_to_string(dir.join(COMMANDS_FILE)).unwrap();
        assert!(!rewritten.contains("fly"));
        assert!(rewritten.contains("unpunish"));
        let _ = fs::remove_dir_all(dir);
    }
}
