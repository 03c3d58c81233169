//! Configuration manager for file operations
//!
//! This module provides the `ConfigManager` which handles loading and saving
//! the group server document (JSON) and the application settings (TOML).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::models::GroupConfig;

use super::settings::AppSettings;

/// File names for configuration files
const DATA_FILE: &str = "server_data.json";
const CONFIG_FILE: &str = "config.toml";

/// All stored groups, keyed by group id
pub type ServerDocument = BTreeMap<String, GroupConfig>;

/// Configuration manager for `mcstatus`
///
/// Handles loading and saving configuration files.
/// Configuration is stored in `~/.config/mcstatus/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
    /// Name of the server document inside `config_dir`
    data_file: String,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// The default directory is `~/.config/mcstatus/`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("mcstatus");
        Ok(Self::with_config_dir(config_dir))
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    ///
    /// This is useful for testing or non-standard configurations.
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            data_file: DATA_FILE.to_string(),
        }
    }

    /// Overrides the server document file name
    #[must_use]
    pub fn with_data_file(mut self, data_file: impl Into<String>) -> Self {
        self.data_file = data_file.into();
        self
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the full path of the server document
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.config_dir.join(&self.data_file)
    }

    /// Ensures the configuration directory exists
    ///
    /// Creates the directory and any parent directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    // ========== Server Document ==========

    /// Loads every stored group
    ///
    /// Returns an empty document if the file doesn't exist or is empty.
    /// Groups stored in the legacy flat-list layout are rebuilt into trees.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_document(&self) -> ConfigResult<ServerDocument> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(ServerDocument::new());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(ServerDocument::new());
        }

        let raw: BTreeMap<String, Value> = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Deserialize(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        raw.into_iter()
            .map(|(group_id, value)| {
                GroupConfig::from_value(value)
                    .map(|config| (group_id.clone(), config))
                    .map_err(|e| {
                        ConfigError::Deserialize(format!(
                            "Invalid record for group {group_id} in {}: {e}",
                            path.display()
                        ))
                    })
            })
            .collect()
    }

    /// Saves every group
    ///
    /// The document is written to a sibling temporary file and renamed over
    /// the original, so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_document(&self, document: &ServerDocument) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let path = self.data_path();
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| ConfigError::Serialize(format!("Failed to serialize: {e}")))?;
        Self::write_atomic(&path, &content)
    }

    /// Loads a single group, `None` if it has no record
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    pub fn load_group(&self, group_id: &str) -> ConfigResult<Option<GroupConfig>> {
        Ok(self.load_document()?.remove(group_id))
    }

    /// Replaces a single group's record, keeping all other groups
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn save_group(&self, group_id: &str, config: &GroupConfig) -> ConfigResult<()> {
        let mut document = self.load_document()?;
        document.insert(group_id.to_string(), config.clone());
        self.save_document(&document)
    }

    // ========== Application Settings ==========

    /// Loads application settings from the configuration file
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.config_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| {
            ConfigError::Deserialize(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Saves application settings to the configuration file
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let path = self.config_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(settings)
            .map_err(|e| ConfigError::Serialize(format!("Failed to serialize: {e}")))?;
        Self::write_atomic(&path, &content)
    }

    /// Writes `content` to a temporary file next to `path`, then renames it
    fn write_atomic(path: &Path, content: &str) -> ConfigResult<()> {
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            ConfigError::Write(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, path)
            .map_err(|e| ConfigError::Write(format!("Failed to replace {}: {}", path.display(), e)))
    }
}
