use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_motd")]
    pub motd: String,
    /// Absent, empty, or `"0"` means no password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    12345
}

fn default_max_players() -> u32 {
    10
}

fn default_name() -> String {
    "My server".into()
}

fn default_motd() -> String {
    "server made with Night Tree!".into()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            max_players: default_max_players(),
            name: default_name(),
            motd: default_motd(),
            password: None,
        }
    }
}

impl ServerSection {
    /// The password clients must present, if one is configured.
    pub fn required_password(&self) -> Option<&str> {
        match self.password.as_deref() {
            None | Some("") | Some("0") => None,
            Some(p) => Some(p),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_world_name")]
    pub name: String,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
}

fn default_world_name() -> String {
    "world".into()
}

fn default_width() -> usize {
    nighttree_world::generator::DEFAULT_WIDTH
}

fn default_height() -> usize {
    nighttree_world::generator::DEFAULT_HEIGHT
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Root for `worlds/` and the JSON permission tables.
    #[serde(default = "default_storage_directory")]
    pub directory: PathBuf,
}

fn default_storage_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: default_storage_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path`, or write the defaults there and use them.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        std::fs::write(path, toml::to_string_pretty(&config)?)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            [server]
            address = "0.0.0.0"
            port = 4000
            max_players = 20
            name = "Test"
            motd = "hello"
            password = "hunter2"

            [world]
            name = "arena"
            width = 64
            height = 20

            [storage]
            directory = "/srv/nighttree"

            [logging]
            level = "debug"
        "#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:4000");
        assert_eq!(config.server.max_players, 20);
        assert_eq!(config.server.required_password(), Some("hunter2"));
        assert_eq!(config.world.name, "arena");
        assert_eq!(config.world.width, 64);
        assert_eq!(config.storage.directory, PathBuf::from("/srv/nighttree"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn sections_default_when_absent() {
        let config: ServerConfig = toml::from_str("[server]\nport = 1\n").unwrap();
        assert_eq!(config.server.port, 1);
        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.server.max_players, 10);
        assert_eq!(config.server.required_password(), None);
        assert_eq!(config.world.width, 100);
        assert_eq!(config.world.height, 30);
        assert_eq!(config.storage.directory, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn zero_or_empty_password_disables_check() {
        let mut section = ServerSection::default();
        section.password = Some("0".into());
        assert_eq!(section.required_password(), None);
        section.password = Some(String::new());
        assert_eq!(section.required_password(), None);
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = std::env::temp_dir().join(format!("nighttree_config_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("server.toml");

        let created = ServerConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.server.port, 12345);

        let reloaded = ServerConfig::load_or_create(&path).unwrap();
        assert_eq!(reloaded.server.motd, created.server.motd);
        assert_eq!(reloaded.world.name, "world");
        let _ = std::fs::remove_dir_all(dir);
    }
}
