//! Shared strategies for server trees and group records

use mcstatus_core::models::{tree, FlatServer, GroupConfig, ServerNode, DEFAULT_SERVER_PRIORITY};
use proptest::prelude::*;
use proptest::sample::Index;

/// Strategy for free-text fields, including the empty string
pub fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0".to_string()),
        "[a-zA-Z0-9 _:.-]{1,16}".prop_map(String::from),
        "[一-龥]{1,6}".prop_map(String::from),
    ]
}

/// Strategy for normalised tag colours
pub fn arb_color() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[0-9A-F]{6}".prop_map(String::from)]
}

/// Strategy for priorities, biased towards the default
pub fn arb_priority() -> impl Strategy<Value = i64> {
    prop_oneof![Just(DEFAULT_SERVER_PRIORITY), -50i64..300]
}

/// Per-node attributes without address or parent
#[derive(Debug, Clone)]
pub struct NodeAttrs {
    pub comment: String,
    pub tag: String,
    pub tag_color: String,
    pub ignore_in_list: bool,
    pub priority: i64,
    pub hide_ip: bool,
    pub display_name: String,
}

fn arb_attrs() -> impl Strategy<Value = NodeAttrs> {
    (
        arb_text(),
        arb_text(),
        arb_color(),
        any::<bool>(),
        arb_priority(),
        any::<bool>(),
        arb_text(),
    )
        .prop_map(
            |(comment, tag, tag_color, ignore_in_list, priority, hide_ip, display_name)| NodeAttrs {
                comment,
                tag,
                tag_color,
                ignore_in_list,
                priority,
                hide_ip,
                display_name,
            },
        )
}

/// Address of the `i`-th generated server
pub fn server_ip(i: usize) -> String {
    format!("s{i}.example.com")
}

/// Strategy for trees with unique addresses
///
/// Each generated server either sits at root or under one of the servers
/// generated before it.
pub fn arb_tree(max_nodes: usize) -> impl Strategy<Value = Vec<ServerNode>> {
    prop::collection::vec((arb_attrs(), prop::option::of(any::<Index>())), 0..max_nodes).prop_map(
        |entries| {
            let records = entries
                .into_iter()
                .enumerate()
                .map(|(i, (attrs, parent))| FlatServer {
                    ip: server_ip(i),
                    comment: attrs.comment,
                    tag: attrs.tag,
                    tag_color: attrs.tag_color,
                    ignore_in_list: attrs.ignore_in_list,
                    priority: attrs.priority,
                    hide_ip: attrs.hide_ip,
                    display_name: attrs.display_name,
                    parent_ip: match parent {
                        Some(index) if i > 0 => server_ip(index.index(i)),
                        _ => String::new(),
                    },
                })
                .collect();
            tree::build_tree(records)
        },
    )
}

/// Strategy for whole group records
pub fn arb_group() -> impl Strategy<Value = GroupConfig> {
    (arb_text(), any::<bool>(), arb_tree(16)).prop_map(
        |(footer, show_offline_by_default, servers)| GroupConfig {
            footer,
            show_offline_by_default,
            servers,
        },
    )
}
