//! Configuration management for `mcstatus`
//!
//! This module provides the `ConfigManager` for loading and saving the group
//! server document (JSON) and the application settings (TOML).

mod manager;
pub mod settings;

pub use manager::{ConfigManager, ServerDocument};
pub use settings::{AppSettings, EditorSettings, LoggingSettings, StatusSettings, StorageSettings};
