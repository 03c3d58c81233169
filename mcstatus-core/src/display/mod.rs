//! Display preparation
//!
//! This module turns a stored group tree and a status batch into the view a
//! renderer draws: merged, scrubbed, filtered and ordered servers plus the
//! group footer and the number of servers with players online.

mod listing;
mod merge;

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{GroupConfig, LiveStatus, ServerNode};

pub use listing::format_tree_listing;
pub use merge::{
    active_server_count, filter_and_sort, merge_status, scrub_anonymous_players, EnrichedNode,
    HIDDEN_ADDRESS_LABEL,
};

/// Everything a renderer needs for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayView {
    /// Group footer, empty when unset
    pub footer: String,
    /// Servers to draw, already filtered and ordered
    pub servers: Vec<EnrichedNode>,
    /// Displayed servers that are online with visible players
    pub active_count: usize,
}

impl DisplayView {
    /// Builds the view for a group
    ///
    /// `show_all` keeps offline servers; ignored servers are always dropped.
    #[must_use]
    pub fn build(
        config: &GroupConfig,
        statuses: &HashMap<String, LiveStatus>,
        show_all: bool,
    ) -> Self {
        let mut merged = merge_status(&config.servers, statuses);
        scrub_anonymous_players(&mut merged);
        let servers = filter_and_sort(merged, show_all);
        let active_count = active_server_count(&servers);

        tracing::debug!(
            shown = servers.iter().map(EnrichedNode::subtree_len).sum::<usize>(),
            active_count,
            show_all,
            "Built display view"
        );

        Self {
            footer: config.footer.clone(),
            servers,
            active_count,
        }
    }

    /// Builds the view for a single queried server
    ///
    /// Stored metadata is used when the server is configured; otherwise the
    /// bare address is shown. Children are never included.
    #[must_use]
    pub fn single(query: &str, stored: Option<&ServerNode>, mut status: LiveStatus) -> Self {
        status.scrub_anonymous_players();
        let node = stored.cloned().unwrap_or_else(|| ServerNode::new(query));
        let server = EnrichedNode::from_parts(&node, status);
        let active_count = usize::from(server.status.has_active_players());

        Self {
            footer: String::new(),
            servers: vec![server],
            active_count,
        }
    }

    /// Returns true if no server is shown
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerSample, Players, ANONYMOUS_PLAYER_ID, ANONYMOUS_PLAYER_NAME};

    fn anonymous_only() -> LiveStatus {
        LiveStatus {
            online: true,
            players: Some(Players {
                online: 1,
                max: 10,
                sample: Some(vec![PlayerSample {
                    id: ANONYMOUS_PLAYER_ID.to_string(),
                    name: ANONYMOUS_PLAYER_NAME.to_string(),
                }]),
            }),
            ..LiveStatus::default()
        }
    }

    #[test]
    fn test_build_view() {
        let mut config = GroupConfig::with_servers(vec![
            ServerNode::new("a").with_child(ServerNode::new("b")),
            ServerNode::new("c"),
        ]);
        config.footer = "See you!".to_string();

        let statuses = HashMap::from([
            ("b".to_string(), LiveStatus { online: true, ..LiveStatus::default() }),
            ("c".to_string(), anonymous_only()),
        ]);

        let view = DisplayView::build(&config, &statuses, false);
        assert_eq!(view.footer, "See you!");
        assert_eq!(view.servers.len(), 2);
        // anonymous-only sample is scrubbed, so nobody counts as active
        assert_eq!(view.active_count, 0);
        let c = &view.servers[1];
        assert_eq!(
            c.status
                .players
                .as_ref()
                .and_then(|p| p.sample.as_ref())
                .map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn test_single_view_uses_stored_metadata() {
        let mut stored = ServerNode::new("mc.example.com").with_child(ServerNode::new("sub"));
        stored.tag = "Main".to_string();

        let view = DisplayView::single("mc.example.com", Some(&stored), LiveStatus::default());
        assert_eq!(view.servers[0].tag, "Main");
        assert!(view.servers[0].children.is_empty());

        let view = DisplayView::single("other.example.com", None, LiveStatus::default());
        assert_eq!(view.servers[0].ip, "other.example.com");
    }
}
