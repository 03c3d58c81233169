//! Application settings model
//!
//! This module defines the process-wide settings stored in config.toml. They
//! are loaded once at start-up and handed to the components that need them.

use serde::{Deserialize, Serialize};

/// Application-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Server data storage settings
    #[serde(default)]
    pub storage: StorageSettings,
    /// Web editor settings
    #[serde(default)]
    pub editor: EditorSettings,
    /// Status query settings
    #[serde(default)]
    pub status: StatusSettings,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where group configurations are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// File name of the JSON document, relative to the config directory
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

fn default_data_file() -> String {
    "server_data.json".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

/// External web editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Base URL the encoded configuration is appended to
    #[serde(default = "default_editor_url")]
    pub base_url: String,
}

fn default_editor_url() -> String {
    "https://mcs.xducraft.com/".to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            base_url: default_editor_url(),
        }
    }
}

/// Live status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSettings {
    /// Per-server query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

const fn default_query_timeout() -> u64 {
    5
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl StatusSettings {
    /// The query timeout as a `Duration`
    #[must_use]
    pub const fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query_timeout_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: AppSettings = toml::from_str(
            r#"
            [status]
            query_timeout_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.status.query_timeout_secs, 2);
        assert_eq!(settings.storage.data_file, "server_data.json");
        assert_eq!(settings.logging.level, "info");
        assert!(settings.editor.base_url.starts_with("https://"));
    }
}
