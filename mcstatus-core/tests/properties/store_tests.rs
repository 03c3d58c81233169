//! Property-based tests for the server store
//!
//! These tests exercise the store through arbitrary operation sequences and
//! check the tree invariants after each of them: addresses stay unique,
//! removal takes the whole subtree, the address is immutable, and rejected
//! imports leave the record untouched.

use std::collections::HashSet;
use std::sync::Arc;

use mcstatus_core::models::{tree, GroupConfig, NewServer, ServerNode};
use mcstatus_core::{AddOutcome, ConfigManager, ServerStore};
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::json;
use tempfile::TempDir;

use super::generators::{arb_group, arb_text, arb_tree, server_ip};

const GROUP: &str = "42";

/// One add request drawn from a small address pool, so duplicates happen
#[derive(Debug, Clone)]
struct AddOp {
    ip: usize,
    parent: Option<usize>,
    tag: String,
}

fn arb_add_op() -> impl Strategy<Value = AddOp> {
    (0usize..12, prop::option::of(0usize..14), arb_text())
        .prop_map(|(ip, parent, tag)| AddOp { ip, parent, tag })
}

fn all_ips(nodes: &[ServerNode]) -> Vec<String> {
    tree::flatten_tree(nodes).into_iter().map(|s| s.ip).collect()
}

fn create_file_store() -> (ServerStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());
    (ServerStore::new(Arc::new(manager)), temp_dir)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Uniqueness: no sequence of adds ever produces a repeated address
    #[test]
    fn adds_keep_addresses_unique(ops in prop::collection::vec(arb_add_op(), 1..30)) {
        let store = ServerStore::in_memory();
        let mut expected = HashSet::new();

        for op in ops {
            let ip = server_ip(op.ip);
            let parent = op.parent.map(server_ip);
            let outcome = store
                .add(GROUP, NewServer::new(ip.as_str()).tag(op.tag), parent.as_deref())
                .expect("add should not fail");

            prop_assert_eq!(outcome == AddOutcome::Duplicate, !expected.insert(ip));
        }

        let ips = all_ips(&store.get_tree(GROUP).expect("read should not fail"));
        let unique: HashSet<&String> = ips.iter().collect();
        prop_assert_eq!(unique.len(), ips.len());
        prop_assert_eq!(ips.len(), expected.len());
    }

    /// Subtree removal: removing a node removes exactly its subtree
    #[test]
    fn remove_takes_whole_subtree(servers in arb_tree(16), pick in any::<Index>()) {
        let store = ServerStore::in_memory();
        prop_assume!(!servers.is_empty());
        prop_assert!(store
            .import(GROUP, GroupConfig::with_servers(servers.clone()))
            .expect("import should not fail"));

        let before = all_ips(&servers);
        let target = before[pick.index(before.len())].clone();
        let subtree: HashSet<String> = tree::find(&servers, &target)
            .map(|node| all_ips(std::slice::from_ref(node)).into_iter().collect())
            .unwrap_or_default();

        prop_assert!(store.remove(GROUP, &target).expect("remove should not fail"));

        let after: HashSet<String> = all_ips(&store.get_tree(GROUP).expect("read should not fail"))
            .into_iter()
            .collect();
        for ip in &before {
            prop_assert_eq!(after.contains(ip), !subtree.contains(ip));
        }
    }

    /// Immutable identity: `ip` can never be changed through attributes
    #[test]
    fn address_is_immutable(servers in arb_tree(8), value in arb_text(), pick in any::<Index>()) {
        let store = ServerStore::in_memory();
        prop_assume!(!servers.is_empty());
        store
            .import(GROUP, GroupConfig::with_servers(servers.clone()))
            .expect("import should not fail");
        let before = store.export(GROUP).expect("export should not fail");

        let ips = all_ips(&servers);
        let target = &ips[pick.index(ips.len())];
        prop_assert!(!store
            .set_attribute(GROUP, target, "ip", &value)
            .expect("set should not fail"));
        prop_assert!(!store.clear_attribute(GROUP, target, "ip").expect("clear should not fail"));
        prop_assert_eq!(store.export(GROUP).expect("export should not fail"), before);
    }

    /// Import atomicity: a malformed document leaves the record untouched
    #[test]
    fn malformed_import_is_atomic(config in arb_group()) {
        let (store, _temp) = create_file_store();
        store.import(GROUP, config).expect("import should not fail");
        let before = store.export(GROUP).expect("export should not fail");

        for bad in [
            json!({"servers": "not-a-list"}),
            json!({"footer": 5, "servers": []}),
            json!({"footer": "x"}),
            json!([["a.example.com"]]),
        ] {
            prop_assert!(!store.import_value(GROUP, bad).expect("import should not fail"));
            prop_assert_eq!(&store.export(GROUP).expect("export should not fail"), &before);
        }
    }

    /// Persisted records read back exactly as imported
    #[test]
    fn import_export_round_trip(config in arb_group()) {
        let (store, _temp) = create_file_store();
        prop_assert!(store.import(GROUP, config.clone()).expect("import should not fail"));
        prop_assert_eq!(store.export(GROUP).expect("export should not fail"), config);
    }

    /// Clearing every attribute restores a freshly added node
    #[test]
    fn clear_restores_defaults(servers in arb_tree(8), pick in any::<Index>()) {
        let store = ServerStore::in_memory();
        prop_assume!(!servers.is_empty());
        store
            .import(GROUP, GroupConfig::with_servers(servers.clone()))
            .expect("import should not fail");

        let ips = all_ips(&servers);
        let target = &ips[pick.index(ips.len())];
        for name in mcstatus_core::ServerAttribute::all() {
            prop_assert!(store
                .clear_attribute(GROUP, target, name.as_str())
                .expect("clear should not fail"));
        }

        let mut node = store
            .find(GROUP, target)
            .expect("read should not fail")
            .expect("node exists");
        node.children.clear();
        prop_assert_eq!(node, ServerNode::new(target.as_str()));
    }
}
