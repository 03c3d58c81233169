//! Storage backend trait definition
//!
//! This module defines the `GroupStorage` trait the server store persists
//! through, and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::config::ConfigManager;
use crate::error::ConfigResult;
use crate::models::GroupConfig;

/// Abstraction over the medium group records are persisted in
///
/// Implementations only move whole records; all tree logic lives in
/// [`super::ServerStore`].
pub trait GroupStorage: Send + Sync {
    /// Load the record for a group
    ///
    /// # Returns
    /// `Some(GroupConfig)` if the group has a record, `None` otherwise
    ///
    /// # Errors
    /// Returns `ConfigError` if the medium cannot be read or parsed
    fn load_group(&self, group_id: &str) -> ConfigResult<Option<GroupConfig>>;

    /// Replace the record for a group
    ///
    /// # Errors
    /// Returns `ConfigError` if the medium cannot be written
    fn save_group(&self, group_id: &str, config: &GroupConfig) -> ConfigResult<()>;

    /// Returns the backend identifier
    fn backend_id(&self) -> &'static str;
}

impl GroupStorage for ConfigManager {
    fn load_group(&self, group_id: &str) -> ConfigResult<Option<GroupConfig>> {
        Self::load_group(self, group_id)
    }

    fn save_group(&self, group_id: &str, config: &GroupConfig) -> ConfigResult<()> {
        Self::save_group(self, group_id, config)
    }

    fn backend_id(&self) -> &'static str {
        "json-file"
    }
}

/// Group records held in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    groups: Mutex<HashMap<String, GroupConfig>>,
}

impl MemoryStorage {
    /// Creates an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups with a record
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl GroupStorage for MemoryStorage {
    fn load_group(&self, group_id: &str) -> ConfigResult<Option<GroupConfig>> {
        let groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(groups.get(group_id).cloned())
    }

    fn save_group(&self, group_id: &str, config: &GroupConfig) -> ConfigResult<()> {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        groups.insert(group_id.to_string(), config.clone());
        Ok(())
    }

    fn backend_id(&self) -> &'static str {
        "memory"
    }
}
