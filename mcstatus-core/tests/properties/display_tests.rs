//! Property-based tests for display preparation

use std::collections::HashMap;

use mcstatus_core::display::{filter_and_sort, merge_status, EnrichedNode};
use mcstatus_core::models::{tree, LiveStatus, ServerNode};
use mcstatus_core::{DisplayView, GroupConfig};
use proptest::prelude::*;

use super::generators::arb_tree;

/// Strategy for a tree plus an online flag for each of its servers
fn arb_tree_with_statuses(
) -> impl Strategy<Value = (Vec<ServerNode>, HashMap<String, LiveStatus>)> {
    arb_tree(16).prop_flat_map(|servers| {
        let count = tree::count(&servers);
        (Just(servers), prop::collection::vec(any::<bool>(), count))
    })
    .prop_map(|(servers, flags)| {
        let statuses = tree::flatten_tree(&servers)
            .into_iter()
            .zip(flags)
            .map(|(record, online)| {
                (
                    record.ip,
                    LiveStatus {
                        online,
                        ..LiveStatus::default()
                    },
                )
            })
            .collect();
        (servers, statuses)
    })
}

fn count_enriched(nodes: &[EnrichedNode]) -> usize {
    nodes.iter().map(EnrichedNode::subtree_len).sum()
}

fn check_level(nodes: &[EnrichedNode], show_all: bool) -> Result<(), TestCaseError> {
    for pair in nodes.windows(2) {
        prop_assert!((pair[0].priority, &pair[0].ip) <= (pair[1].priority, &pair[1].ip));
    }
    for node in nodes {
        prop_assert!(!node.ignore_in_list);
        if !show_all {
            prop_assert!(node.is_online() || !node.children.is_empty());
        }
        check_level(&node.children, show_all)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Merging keeps every stored server and the tree shape
    #[test]
    fn merge_preserves_shape((servers, statuses) in arb_tree_with_statuses()) {
        let merged = merge_status(&servers, &statuses);
        prop_assert_eq!(count_enriched(&merged), tree::count(&servers));
        for (node, stored) in merged.iter().zip(&servers) {
            prop_assert_eq!(&node.ip, &stored.ip);
            prop_assert_eq!(node.children.len(), stored.children.len());
        }
    }

    /// Every level is ordered by (priority, ip) and holds no hidden servers
    #[test]
    fn filtered_levels_are_sorted(
        (servers, statuses) in arb_tree_with_statuses(),
        show_all in any::<bool>(),
    ) {
        let shown = filter_and_sort(merge_status(&servers, &statuses), show_all);
        check_level(&shown, show_all)?;
    }

    /// Showing everything never shows fewer servers than the default view
    #[test]
    fn show_all_is_a_superset((servers, statuses) in arb_tree_with_statuses()) {
        let config = GroupConfig::with_servers(servers);
        let all = DisplayView::build(&config, &statuses, true);
        let online = DisplayView::build(&config, &statuses, false);
        prop_assert!(count_enriched(&all.servers) >= count_enriched(&online.servers));
        prop_assert_eq!(all.active_count, online.active_count);
    }
}
