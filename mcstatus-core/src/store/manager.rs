//! Server store for CRUD operations on group trees
//!
//! This module provides the `ServerStore` which handles adding, removing,
//! editing and importing servers with persistence through a [`GroupStorage`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use super::backend::{GroupStorage, MemoryStorage};
use crate::error::{ConfigError, ConfigResult};
use crate::models::{
    tree, AttributeValue, FlatServer, GroupConfig, NewServer, ServerAttribute, ServerNode,
    IDENTITY_FIELD,
};
use crate::validation::normalize_hex_color;

/// Result of [`ServerStore::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Inserted under the requested parent, or at root when none was named
    Added,
    /// A parent was named but not found, so the server went to the root level
    AddedAtRoot,
    /// The address already exists somewhere in the group; nothing changed
    Duplicate,
}

impl AddOutcome {
    /// True when the server was inserted
    #[must_use]
    pub const fn is_added(self) -> bool {
        matches!(self, Self::Added | Self::AddedAtRoot)
    }
}

/// Store for group server trees
///
/// Every mutation loads the group record, applies the change to a copy and
/// persists it only if the change succeeded. Mutations are serialized by a
/// store-wide lock because backends may keep all groups in one document.
pub struct ServerStore {
    /// Persistence backend
    storage: Arc<dyn GroupStorage>,
    /// Held for the whole load-mutate-save cycle
    write_lock: Mutex<()>,
}

impl fmt::Debug for ServerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerStore")
            .field("backend", &self.storage.backend_id())
            .finish_non_exhaustive()
    }
}

impl ServerStore {
    /// Creates a store persisting through the given backend
    #[must_use]
    pub fn new(storage: Arc<dyn GroupStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store backed by process memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Runs `change` on a copy of the group's record and saves it when the
    /// closure returns `Some`
    ///
    /// Returns `None` without writing if the group has no record and
    /// `create_if_missing` is false, or if `change` declined.
    fn mutate<T, F>(
        &self,
        group_id: &str,
        create_if_missing: bool,
        change: F,
    ) -> ConfigResult<Option<T>>
    where
        F: FnOnce(&mut GroupConfig) -> Option<T>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut config = match self.storage.load_group(group_id)? {
            Some(config) => config,
            None if create_if_missing => GroupConfig::default(),
            None => return Ok(None),
        };

        let Some(result) = change(&mut config) else {
            return Ok(None);
        };

        self.storage.save_group(group_id, &config)?;
        debug!(group = group_id, servers = config.server_count(), "Saved group");
        Ok(Some(result))
    }

    // ========== Queries ==========

    /// Returns the group's root-level servers, empty for an unknown group
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn get_tree(&self, group_id: &str) -> ConfigResult<Vec<ServerNode>> {
        Ok(self
            .storage
            .load_group(group_id)?
            .map(|config| config.servers)
            .unwrap_or_default())
    }

    /// Returns every server in depth-first pre-order with its parent address
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn get_flat(&self, group_id: &str) -> ConfigResult<Vec<FlatServer>> {
        Ok(tree::flatten_tree(&self.get_tree(group_id)?))
    }

    /// Finds a server anywhere in the group's tree
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn find(&self, group_id: &str, ip: &str) -> ConfigResult<Option<ServerNode>> {
        Ok(tree::find(&self.get_tree(group_id)?, ip).cloned())
    }

    /// Reads one named attribute of a server
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn get_attribute(
        &self,
        group_id: &str,
        ip: &str,
        attribute: ServerAttribute,
    ) -> ConfigResult<Option<AttributeValue>> {
        Ok(self.find(group_id, ip)?.map(|node| attribute.get(&node)))
    }

    // ========== Tree Mutations ==========

    /// Adds a server, under `parent_ip` when given
    ///
    /// A parent that does not exist is not an error: the server is added at
    /// the root level and [`AddOutcome::AddedAtRoot`] is returned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an empty address, a malformed
    /// tag colour or a parent already at [`tree::MAX_TREE_DEPTH`], or a
    /// backend error.
    pub fn add(
        &self,
        group_id: &str,
        mut server: NewServer,
        parent_ip: Option<&str>,
    ) -> ConfigResult<AddOutcome> {
        server.ip = server.ip.trim().to_string();
        if server.ip.is_empty() {
            return Err(ConfigError::validation(IDENTITY_FIELD, "server address cannot be empty"));
        }
        if let Some(color) = server.tag_color.take().filter(|c| !c.is_empty()) {
            let normalized = normalize_hex_color(&color).ok_or_else(|| {
                ConfigError::validation("tag_color", format!("invalid colour '{color}'"))
            })?;
            server.tag_color = Some(normalized);
        }

        let parent_ip = parent_ip.map(str::trim).filter(|p| !p.is_empty());
        let ip = server.ip.clone();

        let mut too_deep = false;
        let outcome = self.mutate(group_id, true, |config| {
            if tree::contains(&config.servers, &ip) {
                return None;
            }
            if parent_ip
                .and_then(|p| tree::depth_of(&config.servers, p))
                .is_some_and(|level| level >= tree::MAX_TREE_DEPTH)
            {
                too_deep = true;
                return None;
            }
            let attached = tree::insert(&mut config.servers, server.into_node(), parent_ip);
            Some(if parent_ip.is_some() && !attached {
                AddOutcome::AddedAtRoot
            } else {
                AddOutcome::Added
            })
        })?;

        if too_deep {
            warn!(group = group_id, ip = %ip, parent = ?parent_ip, "Parent is nested too deep");
            return Err(ConfigError::validation(
                "parent_ip",
                format!(
                    "servers cannot be nested more than {} levels deep",
                    tree::MAX_TREE_DEPTH
                ),
            ));
        }

        match outcome {
            Some(AddOutcome::AddedAtRoot) => {
                warn!(
                    group = group_id,
                    ip = %ip,
                    parent = ?parent_ip,
                    "Parent not found, added at root"
                );
                Ok(AddOutcome::AddedAtRoot)
            }
            Some(outcome) => Ok(outcome),
            None => {
                debug!(group = group_id, ip = %ip, "Server already exists");
                Ok(AddOutcome::Duplicate)
            }
        }
    }

    /// Removes a server together with its whole subtree
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn remove(&self, group_id: &str, ip: &str) -> ConfigResult<bool> {
        let removed = self.mutate(group_id, false, |config| tree::remove(&mut config.servers, ip))?;
        if let Some(node) = &removed {
            debug!(group = group_id, ip, subtree = node.subtree_len(), "Removed server");
        }
        Ok(removed.is_some())
    }

    // ========== Attributes ==========

    /// Sets a named attribute from its textual form
    ///
    /// The identity field `ip` is never modified; attempting it returns
    /// `Ok(false)`. A missing server also returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown attribute name or a
    /// value that does not parse, or a backend error.
    pub fn set_attribute(
        &self,
        group_id: &str,
        ip: &str,
        name: &str,
        raw_value: &str,
    ) -> ConfigResult<bool> {
        if name.trim().eq_ignore_ascii_case(IDENTITY_FIELD) {
            warn!(group = group_id, ip, "Refusing to modify the server address");
            return Ok(false);
        }
        let attribute: ServerAttribute = name.parse()?;
        let value = attribute.parse_value(raw_value)?;
        self.set_attribute_value(group_id, ip, attribute, value)
    }

    /// Sets a typed attribute value
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the value kind does not match the
    /// attribute or a colour is malformed, or a backend error.
    pub fn set_attribute_value(
        &self,
        group_id: &str,
        ip: &str,
        attribute: ServerAttribute,
        value: AttributeValue,
    ) -> ConfigResult<bool> {
        let value = attribute.validate(value)?;
        let updated = self.mutate(group_id, false, |config| {
            let node = tree::find_mut(&mut config.servers, ip)?;
            attribute.apply(node, value);
            Some(())
        })?;
        Ok(updated.is_some())
    }

    /// Resets a named attribute to its default
    ///
    /// Returns `Ok(false)` for the identity field, an unknown name or a
    /// missing server.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn clear_attribute(&self, group_id: &str, ip: &str, name: &str) -> ConfigResult<bool> {
        let Some(attribute) = ServerAttribute::parse(name) else {
            warn!(group = group_id, ip, attribute = name, "Cannot clear attribute");
            return Ok(false);
        };
        let cleared = self.mutate(group_id, false, |config| {
            let node = tree::find_mut(&mut config.servers, ip)?;
            attribute.clear(node);
            Some(())
        })?;
        Ok(cleared.is_some())
    }

    // ========== Group Settings ==========

    /// Returns the group's footer, empty when unset
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn get_footer(&self, group_id: &str) -> ConfigResult<String> {
        Ok(self.export(group_id)?.footer)
    }

    /// Sets the group's footer
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn set_footer(&self, group_id: &str, footer: &str) -> ConfigResult<bool> {
        let footer = footer.to_string();
        let saved = self.mutate(group_id, true, |config| {
            config.footer = footer;
            Some(())
        })?;
        Ok(saved.is_some())
    }

    /// Clears the group's footer; false if the group has no record
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn clear_footer(&self, group_id: &str) -> ConfigResult<bool> {
        let cleared = self.mutate(group_id, false, |config| {
            config.footer.clear();
            Some(())
        })?;
        Ok(cleared.is_some())
    }

    /// Whether plain status queries also list offline servers
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn get_show_offline_default(&self, group_id: &str) -> ConfigResult<bool> {
        Ok(self.export(group_id)?.show_offline_by_default)
    }

    /// Sets whether plain status queries also list offline servers
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn set_show_offline_default(&self, group_id: &str, show: bool) -> ConfigResult<bool> {
        let saved = self.mutate(group_id, true, |config| {
            config.show_offline_by_default = show;
            Some(())
        })?;
        Ok(saved.is_some())
    }

    // ========== Import / Export ==========

    /// Returns the group's full record, defaults for an unknown group
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn export(&self, group_id: &str) -> ConfigResult<GroupConfig> {
        Ok(self.storage.load_group(group_id)?.unwrap_or_default())
    }

    /// Replaces the group's whole record
    ///
    /// Colours are normalised first. A record that breaks the tree
    /// invariants is rejected with `Ok(false)` and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn import(&self, group_id: &str, mut config: GroupConfig) -> ConfigResult<bool> {
        config.normalize();
        if let Err(e) = config.validate() {
            warn!(group = group_id, error = %e, "Rejected import");
            return Ok(false);
        }

        let servers = config.server_count();
        let replaced = self.mutate(group_id, true, |current| {
            *current = config;
            Some(())
        })?;
        debug!(group = group_id, servers, "Imported group");
        Ok(replaced.is_some())
    }

    /// Replaces the group's whole record from an untrusted JSON document
    ///
    /// Accepts the nested layout and the legacy flat list. A malformed
    /// document is rejected with `Ok(false)` and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn import_value(&self, group_id: &str, value: Value) -> ConfigResult<bool> {
        match GroupConfig::from_value(value) {
            Ok(config) => self.import(group_id, config),
            Err(e) => {
                warn!(group = group_id, error = %e, "Rejected malformed import");
                Ok(false)
            }
        }
    }
}
