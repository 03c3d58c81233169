//! Per-group configuration record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::server::{FlatServer, ServerNode};
use super::tree;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::normalize_hex_color;

/// Everything stored for one chat group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Text appended below the rendered server list
    #[serde(default)]
    pub footer: String,
    /// Whether a plain status query also lists offline servers
    #[serde(default)]
    pub show_offline_by_default: bool,
    /// Root-level servers
    #[serde(default)]
    pub servers: Vec<ServerNode>,
}

impl GroupConfig {
    /// Creates a record holding the given servers and default settings
    #[must_use]
    pub fn with_servers(servers: Vec<ServerNode>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    /// Parses an untrusted JSON document into a group record
    ///
    /// `servers` must be present and hold an array. Entries may either be
    /// nested nodes (`children`) or legacy flat records linked by
    /// `parent_ip`; the latter are rebuilt into a tree.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first shape problem.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(ConfigError::validation("group", "expected a JSON object"));
        };

        let footer = match map.remove("footer") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(_) => return Err(ConfigError::validation("footer", "expected a string")),
        };

        let show_offline_by_default = match map.remove("show_offline_by_default") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => b,
            Some(_) => {
                return Err(ConfigError::validation(
                    "show_offline_by_default",
                    "expected a boolean",
                ))
            }
        };

        let entries = match map.remove("servers") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ConfigError::validation("servers", "expected an array")),
            None => return Err(ConfigError::validation("servers", "field is missing")),
        };

        let servers = if is_legacy_flat_list(&entries) {
            let records: Vec<FlatServer> = serde_json::from_value(Value::Array(entries))
                .map_err(|e| ConfigError::validation("servers", e.to_string()))?;
            tree::build_tree(records)
        } else {
            serde_json::from_value(Value::Array(entries))
                .map_err(|e| ConfigError::validation("servers", e.to_string()))?
        };

        Ok(Self {
            footer,
            show_offline_by_default,
            servers,
        })
    }

    /// Uppercases tag colours and strips any leading `#`
    ///
    /// Colours that are not valid hex codes are left as they are so that
    /// [`GroupConfig::validate`] can report them.
    pub fn normalize(&mut self) {
        fn walk(nodes: &mut [ServerNode]) {
            for node in nodes {
                if let Some(color) = normalize_hex_color(&node.tag_color) {
                    node.tag_color = color;
                }
                walk(&mut node.children);
            }
        }
        walk(&mut self.servers);
    }

    /// Checks the tree invariants
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an address is empty or appears
    /// twice, the tree is nested deeper than [`tree::MAX_TREE_DEPTH`], or a
    /// tag colour is not six uppercase hex digits.
    pub fn validate(&self) -> ConfigResult<()> {
        let records = tree::flatten_tree(&self.servers);

        if records.iter().any(|r| r.ip.trim().is_empty()) {
            return Err(ConfigError::validation("ip", "server address cannot be empty"));
        }

        if let Some(ip) = tree::duplicate_ips(&self.servers).into_iter().next() {
            return Err(ConfigError::validation(
                "ip",
                format!("server {ip} appears more than once"),
            ));
        }

        let levels = tree::depth(&self.servers);
        if levels > tree::MAX_TREE_DEPTH {
            return Err(ConfigError::validation(
                "servers",
                format!(
                    "tree is {levels} levels deep, at most {} are allowed",
                    tree::MAX_TREE_DEPTH
                ),
            ));
        }

        if let Some(bad) = records.iter().find(|r| {
            !r.tag_color.is_empty()
                && normalize_hex_color(&r.tag_color).as_deref() != Some(r.tag_color.as_str())
        }) {
            return Err(ConfigError::validation(
                "tag_color",
                format!("invalid colour '{}' on server {}", bad.tag_color, bad.ip),
            ));
        }

        Ok(())
    }

    /// Number of servers in the whole tree
    #[must_use]
    pub fn server_count(&self) -> usize {
        tree::count(&self.servers)
    }
}

/// A flat legacy list carries `parent_ip` links and never `children`
fn is_legacy_flat_list(entries: &[Value]) -> bool {
    let has_children = entries.iter().any(|e| e.get("children").is_some());
    let has_parent_links = entries.iter().any(|e| {
        e.get("parent_ip")
            .and_then(Value::as_str)
            .is_some_and(|p| !p.is_empty())
    });
    has_parent_links && !has_children
}
