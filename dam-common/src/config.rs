//! Configuration loading and path resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal; a warning is logged and
//! the defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DAM_CONFIG";
pub const DATA_FOLDER_ENV_VAR: &str = "DAM_DATA_FOLDER";
pub const RECORDINGS_DB_ENV_VAR: &str = "DAM_RECORDINGS_DB";
pub const MUSIC_DB_ENV_VAR: &str = "DAM_MUSIC_DB";
pub const CREATOR_ENV_VAR: &str = "DAM_CREATOR";

pub const RECORDINGS_DB_FILE: &str = "recording_projects.db";
pub const MUSIC_DB_FILE: &str = "music.sqlite";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Name written into Creator/Originator tags
    pub creator: Option<String>,
    /// Folder holding the databases when no explicit path is given
    pub data_folder: Option<PathBuf>,
    pub recordings_db: Option<PathBuf>,
    pub music_db: Option<PathBuf>,
    pub sync: SyncConfig,
}

/// Settings for the CMS synchronization wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Live host, e.g. `10.10.10.17`; may be empty for a locally mounted path
    pub live_server: String,
    /// Local testing host
    pub local_server: String,
    /// CMS root on both servers
    pub server_path: String,
    /// rsync `--bwlimit` for transfers to or from the live server
    pub bandwidth_limit: Option<String>,
    /// Additional exclude rules appended to the common filter list
    pub extra_filters: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            live_server: String::new(),
            local_server: String::new(),
            server_path: "/var/www/html/".to_string(),
            bandwidth_limit: Some("8m".to_string()),
            extra_filters: Vec::new(),
        }
    }
}

impl TomlConfig {
    /// Load the config file from its resolved location, falling back to defaults
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Some(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load and parse a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Write the config back as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creator name from CLI, environment or config file
    pub fn resolve_creator(&self, cli_arg: Option<&str>) -> Option<String> {
        cli_arg
            .map(str::to_string)
            .or_else(|| non_empty_env(CREATOR_ENV_VAR))
            .or_else(|| self.creator.clone())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn resolve_data_folder(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(
            cli_arg,
            DATA_FOLDER_ENV_VAR,
            self.data_folder.as_deref(),
            default_data_folder,
        )
    }

    /// Recordings database path; defaults into the data folder
    pub fn resolve_recordings_db(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, RECORDINGS_DB_ENV_VAR, self.recordings_db.as_deref(), || {
            self.resolve_data_folder(None).join(RECORDINGS_DB_FILE)
        })
    }

    /// Sheet music database path; defaults into the data folder
    pub fn resolve_music_db(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, MUSIC_DB_ENV_VAR, self.music_db.as_deref(), || {
            self.resolve_data_folder(None).join(MUSIC_DB_FILE)
        })
    }
}

/// Pick the first of CLI argument, environment variable, config value, fallback
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config_value: Option<&Path>,
    fallback: impl FnOnce() -> PathBuf,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    fallback()
}

/// Location of the config file: `$DAM_CONFIG`, else `<config dir>/dam/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_env(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("dam").join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dam"))
        .unwrap_or_else(|| PathBuf::from("./dam_data"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_defaults() {
        let sync = SyncConfig::default();
        assert_eq!(sync.server_path, "/var/www/html/");
        assert_eq!(sync.bandwidth_limit.as_deref(), Some("8m"));
        assert!(sync.live_server.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            creator = "Jane Archivist"

            [sync]
            live_server = "10.10.10.17"
            "#,
        )
        .unwrap();

        assert_eq!(config.creator.as_deref(), Some("Jane Archivist"));
        assert_eq!(config.sync.live_server, "10.10.10.17");
        assert_eq!(config.sync.server_path, "/var/www/html/");
        assert!(config.recordings_db.is_none());
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = TomlConfig {
            music_db: Some(PathBuf::from("/from/toml.sqlite")),
            ..Default::default()
        };
        let resolved = config.resolve_music_db(Some(Path::new("/from/cli.sqlite")));
        assert_eq!(resolved, PathBuf::from("/from/cli.sqlite"));
    }

    #[test]
    fn test_blank_creator_is_none() {
        let config = TomlConfig {
            creator: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_creator(Some("")), None);
    }
}
