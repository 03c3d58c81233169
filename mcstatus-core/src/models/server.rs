//! Server node model: one configured game server and the servers nested under it.

use serde::{Deserialize, Serialize};

/// Priority assigned to servers that never had one set.
///
/// Lower priorities sort earlier, so unprioritised servers land after any
/// server an admin has explicitly ranked.
pub const DEFAULT_SERVER_PRIORITY: i64 = 100;

const fn default_priority() -> i64 {
    DEFAULT_SERVER_PRIORITY
}

/// A configured server and its logically grouped children
///
/// Nodes form a tree purely by nesting. The `ip` is the primary key and is
/// unique across the whole tree of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNode {
    /// Address used both as identifier and as the status query string
    pub ip: String,
    /// Free-text label
    #[serde(default)]
    pub comment: String,
    /// Short badge label
    #[serde(default)]
    pub tag: String,
    /// Badge colour as six uppercase hex digits without `#`
    #[serde(default)]
    pub tag_color: String,
    /// Excludes this node and its subtree from listings
    #[serde(default)]
    pub ignore_in_list: bool,
    /// Sort priority (lower values appear first)
    #[serde(default = "default_priority")]
    pub priority: i64,
    /// Shows `display_name` instead of the raw address
    #[serde(default)]
    pub hide_ip: bool,
    /// Name shown in place of the address when `hide_ip` is set
    #[serde(default)]
    pub display_name: String,
    /// Servers grouped under this one
    #[serde(default)]
    pub children: Vec<ServerNode>,
}

impl ServerNode {
    /// Creates a node with every attribute at its default
    #[must_use]
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            comment: String::new(),
            tag: String::new(),
            tag_color: String::new(),
            ignore_in_list: false,
            priority: DEFAULT_SERVER_PRIORITY,
            hide_ip: false,
            display_name: String::new(),
            children: Vec::new(),
        }
    }

    /// Appends a child and returns `self` for chaining
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Returns a copy of this node's own fields, without children
    #[must_use]
    pub fn to_flat(&self, parent_ip: &str) -> FlatServer {
        FlatServer {
            ip: self.ip.clone(),
            comment: self.comment.clone(),
            tag: self.tag.clone(),
            tag_color: self.tag_color.clone(),
            ignore_in_list: self.ignore_in_list,
            priority: self.priority,
            hide_ip: self.hide_ip,
            display_name: self.display_name.clone(),
            parent_ip: parent_ip.to_string(),
        }
    }

    /// Total number of nodes in this subtree, including `self`
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A server record without nesting
///
/// This is both the element type of a flattened tree and the record shape of
/// the legacy flat-list format, where hierarchy was expressed through
/// `parent_ip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatServer {
    /// Server address
    pub ip: String,
    /// Free-text label
    #[serde(default)]
    pub comment: String,
    /// Short badge label
    #[serde(default)]
    pub tag: String,
    /// Badge colour
    #[serde(default)]
    pub tag_color: String,
    /// Excluded from listings
    #[serde(default)]
    pub ignore_in_list: bool,
    /// Sort priority
    #[serde(default = "default_priority")]
    pub priority: i64,
    /// Hide the raw address
    #[serde(default)]
    pub hide_ip: bool,
    /// Replacement name for the address
    #[serde(default)]
    pub display_name: String,
    /// Address of the containing server, empty for root entries
    #[serde(default)]
    pub parent_ip: String,
}

impl FlatServer {
    /// Converts back into a childless tree node
    #[must_use]
    pub fn into_node(self) -> ServerNode {
        ServerNode {
            ip: self.ip,
            comment: self.comment,
            tag: self.tag,
            tag_color: self.tag_color,
            ignore_in_list: self.ignore_in_list,
            priority: self.priority,
            hide_ip: self.hide_ip,
            display_name: self.display_name,
            children: Vec::new(),
        }
    }

    /// Returns true if this record has no parent
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_ip.is_empty()
    }
}

/// Attributes supplied when adding a server
///
/// Unset fields take the same defaults as [`ServerNode::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewServer {
    /// Server address
    pub ip: String,
    /// Free-text label
    pub comment: Option<String>,
    /// Badge label
    pub tag: Option<String>,
    /// Badge colour, any case, optional leading `#`
    pub tag_color: Option<String>,
    /// Sort priority
    pub priority: Option<i64>,
    /// Excluded from listings
    pub ignore_in_list: Option<bool>,
    /// Hide the raw address
    pub hide_ip: Option<bool>,
    /// Replacement name for the address
    pub display_name: Option<String>,
}

impl NewServer {
    /// Creates a request with only the address set
    #[must_use]
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            ..Self::default()
        }
    }

    /// Sets the badge label
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the badge colour
    #[must_use]
    pub fn tag_color(mut self, color: impl Into<String>) -> Self {
        self.tag_color = Some(color.into());
        self
    }

    /// Sets the comment
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the priority
    #[must_use]
    pub const fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Builds the node, filling defaults for unset attributes
    ///
    /// The colour is expected to be normalised already.
    #[must_use]
    pub fn into_node(self) -> ServerNode {
        let mut node = ServerNode::new(self.ip);
        node.comment = self.comment.unwrap_or_default();
        node.tag = self.tag.unwrap_or_default();
        node.tag_color = self.tag_color.unwrap_or_default();
        node.priority = self.priority.unwrap_or(DEFAULT_SERVER_PRIORITY);
        node.ignore_in_list = self.ignore_in_list.unwrap_or(false);
        node.hide_ip = self.hide_ip.unwrap_or(false);
        node.display_name = self.display_name.unwrap_or_default();
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_priority_deserializes_to_default() {
        let node: ServerNode = serde_json::from_str(r#"{"ip": "mc.example.com"}"#).unwrap();
        assert_eq!(node.priority, DEFAULT_SERVER_PRIORITY);
        assert!(node.children.is_empty());
        assert!(!node.hide_ip);
    }

    #[test]
    fn test_new_server_fills_defaults() {
        let node = NewServer::new("a.example.com").tag("Survival").into_node();
        assert_eq!(node.tag, "Survival");
        assert_eq!(node.priority, DEFAULT_SERVER_PRIORITY);
        assert!(node.comment.is_empty());
    }

    #[test]
    fn test_subtree_len() {
        let node = ServerNode::new("a")
            .with_child(ServerNode::new("b").with_child(ServerNode::new("c")))
            .with_child(ServerNode::new("d"));
        assert_eq!(node.subtree_len(), 4);
    }
}
