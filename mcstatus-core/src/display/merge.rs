//! Merging live status onto the stored tree, then filtering and ordering it
//! for display.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::{LiveStatus, ServerNode};

/// Label shown for a hidden address with neither display name nor tag
pub const HIDDEN_ADDRESS_LABEL: &str = "Hidden server";

/// Reason recorded for servers missing from a status batch
const NO_STATUS_REASON: &str = "no status reported";

/// A stored server joined with its live status
///
/// The stored metadata is kept apart from the status record, so a status
/// field can never overwrite configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedNode {
    /// Server address as stored
    pub ip: String,
    /// Free-text label
    pub comment: String,
    /// Badge label
    pub tag: String,
    /// Badge colour, six uppercase hex digits or empty
    pub tag_color: String,
    /// Excluded from listings
    pub ignore_in_list: bool,
    /// Sort priority, lower first
    pub priority: i64,
    /// Hide the raw address
    pub hide_ip: bool,
    /// Replacement name for the address
    pub display_name: String,
    /// Live status
    pub status: LiveStatus,
    /// Enriched children
    pub children: Vec<EnrichedNode>,
}

impl EnrichedNode {
    /// Joins one stored node, without its children, with a status
    #[must_use]
    pub fn from_parts(node: &ServerNode, status: LiveStatus) -> Self {
        Self {
            ip: node.ip.clone(),
            comment: node.comment.clone(),
            tag: node.tag.clone(),
            tag_color: node.tag_color.clone(),
            ignore_in_list: node.ignore_in_list,
            priority: node.priority,
            hide_ip: node.hide_ip,
            display_name: node.display_name.clone(),
            status,
            children: Vec::new(),
        }
    }

    /// Whether the server answered the status query
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.status.online
    }

    /// Text to show in place of the address
    ///
    /// When the address is hidden this is the display name, then the tag,
    /// then a fixed placeholder; the raw address is never returned.
    #[must_use]
    pub fn address_label(&self) -> &str {
        if !self.hide_ip {
            return &self.ip;
        }
        [self.display_name.as_str(), self.tag.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(HIDDEN_ADDRESS_LABEL)
    }

    /// Number of nodes in this subtree, including this one
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Joins a stored tree with a status batch, preserving its shape
///
/// Servers missing from `statuses` get an offline record.
#[must_use]
pub fn merge_status(
    nodes: &[ServerNode],
    statuses: &HashMap<String, LiveStatus>,
) -> Vec<EnrichedNode> {
    nodes
        .iter()
        .map(|node| {
            let status = statuses
                .get(&node.ip)
                .cloned()
                .unwrap_or_else(|| LiveStatus::offline(node.ip.as_str(), NO_STATUS_REASON));
            let mut enriched = EnrichedNode::from_parts(node, status);
            enriched.children = merge_status(&node.children, statuses);
            enriched
        })
        .collect()
}

/// Drops hidden and offline servers and orders each level
///
/// A server marked `ignore_in_list` is dropped together with its subtree.
/// Otherwise it is kept when `show_all` is set, when it is online, or when
/// at least one of its children survives. Each level is sorted by
/// `(priority, ip)`.
#[must_use]
pub fn filter_and_sort(nodes: Vec<EnrichedNode>, show_all: bool) -> Vec<EnrichedNode> {
    let mut kept: Vec<EnrichedNode> = nodes
        .into_iter()
        .filter(|node| !node.ignore_in_list)
        .filter_map(|mut node| {
            node.children = filter_and_sort(std::mem::take(&mut node.children), show_all);
            (show_all || node.is_online() || !node.children.is_empty()).then_some(node)
        })
        .collect();
    kept.sort_by(display_order);
    kept
}

fn display_order(a: &EnrichedNode, b: &EnrichedNode) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| a.ip.cmp(&b.ip))
}

/// Removes anonymous placeholder players from every status in the tree
pub fn scrub_anonymous_players(nodes: &mut [EnrichedNode]) {
    for node in nodes {
        node.status.scrub_anonymous_players();
        scrub_anonymous_players(&mut node.children);
    }
}

/// Number of servers in the tree that are online with visible players
#[must_use]
pub fn active_server_count(nodes: &[EnrichedNode]) -> usize {
    nodes
        .iter()
        .map(|node| {
            usize::from(node.status.has_active_players()) + active_server_count(&node.children)
        })
        .sum()
}
