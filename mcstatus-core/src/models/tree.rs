//! Algorithms over nested server trees
//!
//! All lookups are depth-first and pre-order, matching the order in which an
//! admin sees servers in `/mcs list`.

use std::collections::{HashMap, HashSet};

use super::server::{FlatServer, ServerNode};

/// Deepest nesting level a stored tree may reach; root servers are level 1
///
/// Each level costs two levels of JSON nesting in the data file and in the
/// editor payload, and both are parsed with serde_json's recursion limit.
pub const MAX_TREE_DEPTH: usize = 32;

/// Finds a node anywhere in the tree
#[must_use]
pub fn find<'a>(nodes: &'a [ServerNode], ip: &str) -> Option<&'a ServerNode> {
    for node in nodes {
        if node.ip == ip {
            return Some(node);
        }
        if let Some(found) = find(&node.children, ip) {
            return Some(found);
        }
    }
    None
}

/// Finds a node anywhere in the tree for mutation
pub fn find_mut<'a>(nodes: &'a mut [ServerNode], ip: &str) -> Option<&'a mut ServerNode> {
    for node in nodes {
        if node.ip == ip {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, ip) {
            return Some(found);
        }
    }
    None
}

/// Returns true if any node in the tree has this address
#[must_use]
pub fn contains(nodes: &[ServerNode], ip: &str) -> bool {
    find(nodes, ip).is_some()
}

/// Detaches a node and its subtree from whichever list contains it
pub fn remove(nodes: &mut Vec<ServerNode>, ip: &str) -> Option<ServerNode> {
    if let Some(index) = nodes.iter().position(|n| n.ip == ip) {
        return Some(nodes.remove(index));
    }
    nodes
        .iter_mut()
        .find_map(|node| remove(&mut node.children, ip))
}

/// Inserts a node under `parent_ip`, or at root when the parent is missing
///
/// Returns true if the parent was found.
pub fn insert(nodes: &mut Vec<ServerNode>, node: ServerNode, parent_ip: Option<&str>) -> bool {
    let parent = match parent_ip {
        Some(p) => find_mut(nodes, p),
        None => None,
    };
    if let Some(parent) = parent {
        parent.children.push(node);
        return true;
    }
    nodes.push(node);
    false
}

/// Number of nodes in the whole tree
#[must_use]
pub fn count(nodes: &[ServerNode]) -> usize {
    nodes.iter().map(ServerNode::subtree_len).sum()
}

/// Number of levels in the tree, 0 when empty
#[must_use]
pub fn depth(nodes: &[ServerNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + depth(&node.children))
        .max()
        .unwrap_or(0)
}

/// Level of the node with this address, 1 for root servers
#[must_use]
pub fn depth_of(nodes: &[ServerNode], ip: &str) -> Option<usize> {
    for node in nodes {
        if node.ip == ip {
            return Some(1);
        }
        if let Some(level) = depth_of(&node.children, ip) {
            return Some(level + 1);
        }
    }
    None
}

/// Flattens a tree into records carrying their parent address
#[must_use]
pub fn flatten_tree(nodes: &[ServerNode]) -> Vec<FlatServer> {
    let mut out = Vec::with_capacity(count(nodes));
    flatten_into(nodes, "", &mut out);
    out
}

fn flatten_into(nodes: &[ServerNode], parent_ip: &str, out: &mut Vec<FlatServer>) {
    for node in nodes {
        out.push(node.to_flat(parent_ip));
        flatten_into(&node.children, &node.ip, out);
    }
}

/// Rebuilds a tree from flat records linked by `parent_ip`
///
/// Records whose parent does not exist stay at root, so no entry is lost.
/// A record naming itself as parent, or that would close a cycle, is also
/// placed at root. Duplicate addresses keep only the first occurrence. Order
/// within each level follows the input order.
#[must_use]
pub fn build_tree(records: Vec<FlatServer>) -> Vec<ServerNode> {
    let mut seen = HashSet::new();
    let records: Vec<FlatServer> = records
        .into_iter()
        .filter(|r| seen.insert(r.ip.clone()))
        .collect();

    let known: HashSet<&str> = records.iter().map(|r| r.ip.as_str()).collect();
    let parent_of: HashMap<&str, &str> = records
        .iter()
        .filter(|r| !r.is_root() && known.contains(r.parent_ip.as_str()))
        .map(|r| (r.ip.as_str(), r.parent_ip.as_str()))
        .collect();

    // A record is attached to its parent only if walking up from it reaches
    // a root without revisiting itself.
    let attached: HashSet<String> = parent_of
        .keys()
        .filter(|ip| reaches_root(ip, &parent_of))
        .map(|ip| (*ip).to_string())
        .collect();

    let mut children_of: HashMap<String, Vec<FlatServer>> = HashMap::new();
    let mut roots = Vec::new();
    for record in records {
        if attached.contains(&record.ip) {
            children_of
                .entry(record.parent_ip.clone())
                .or_default()
                .push(record);
        } else {
            roots.push(record);
        }
    }

    roots
        .into_iter()
        .map(|r| assemble(r, &mut children_of))
        .collect()
}

fn reaches_root(start: &str, parent_of: &HashMap<&str, &str>) -> bool {
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(parent) = parent_of.get(current) {
        if !visited.insert(current) || *parent == start {
            return false;
        }
        current = *parent;
    }
    true
}

fn assemble(record: FlatServer, children_of: &mut HashMap<String, Vec<FlatServer>>) -> ServerNode {
    let children = children_of.remove(&record.ip).unwrap_or_default();
    let mut node = record.into_node();
    node.children = children
        .into_iter()
        .map(|c| assemble(c, children_of))
        .collect();
    node
}

/// Returns every address that appears more than once in the tree
#[must_use]
pub fn duplicate_ips(nodes: &[ServerNode]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for record in flatten_tree(nodes) {
        if !seen.insert(record.ip.clone()) && !duplicates.contains(&record.ip) {
            duplicates.push(record.ip);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<ServerNode> {
        vec![
            ServerNode::new("a")
                .with_child(ServerNode::new("a1"))
                .with_child(ServerNode::new("a2").with_child(ServerNode::new("a2x"))),
            ServerNode::new("b"),
        ]
    }

    fn flat(ip: &str, parent: &str) -> FlatServer {
        ServerNode::new(ip).to_flat(parent)
    }

    #[test]
    fn test_find_nested() {
        let tree = sample_tree();
        assert_eq!(find(&tree, "a2x").map(|n| n.ip.as_str()), Some("a2x"));
        assert!(find(&tree, "zzz").is_none());
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = sample_tree();
        let removed = remove(&mut tree, "a2").unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(!contains(&tree, "a2x"));
        assert!(contains(&tree, "a1"));
        assert_eq!(count(&tree), 3);
    }

    #[test]
    fn test_insert_falls_back_to_root() {
        let mut tree = sample_tree();
        assert!(insert(&mut tree, ServerNode::new("c"), Some("a1")));
        assert_eq!(find(&tree, "a1").unwrap().children[0].ip, "c");

        assert!(!insert(&mut tree, ServerNode::new("d"), Some("missing")));
        assert_eq!(tree.last().unwrap().ip, "d");
    }

    #[test]
    fn test_flatten_is_preorder() {
        let ips: Vec<_> = flatten_tree(&sample_tree()).into_iter().map(|r| r.ip).collect();
        assert_eq!(ips, vec!["a", "a1", "a2", "a2x", "b"]);
        let records = flatten_tree(&sample_tree());
        assert_eq!(records[3].parent_ip, "a2");
        assert!(records[4].is_root());
    }

    #[test]
    fn test_build_tree_inverts_flatten() {
        let tree = sample_tree();
        assert_eq!(build_tree(flatten_tree(&tree)), tree);
    }

    #[test]
    fn test_build_tree_keeps_orphans_at_root() {
        let tree = build_tree(vec![flat("child", "ghost"), flat("root", "")]);
        let ips: Vec<_> = tree.iter().map(|n| n.ip.as_str()).collect();
        assert_eq!(ips, vec!["child", "root"]);
    }

    #[test]
    fn test_build_tree_breaks_cycles() {
        let tree = build_tree(vec![flat("x", "y"), flat("y", "x"), flat("self", "self")]);
        assert_eq!(count(&tree), 3);
        assert!(tree.iter().any(|n| n.ip == "self"));
    }

    #[test]
    fn test_build_tree_child_before_parent() {
        let tree = build_tree(vec![flat("c", "p"), flat("p", "")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].ip, "c");
    }

    #[test]
    fn test_duplicate_ips() {
        let tree = vec![
            ServerNode::new("a").with_child(ServerNode::new("b")),
            ServerNode::new("b"),
        ];
        assert_eq!(duplicate_ips(&tree), vec!["b".to_string()]);
        assert!(duplicate_ips(&sample_tree()).is_empty());
    }

    fn chain(levels: usize) -> Vec<ServerNode> {
        let mut node = ServerNode::new(format!("s{}.example.com", levels - 1));
        for i in (0..levels - 1).rev() {
            node = ServerNode::new(format!("s{i}.example.com")).with_child(node);
        }
        vec![node]
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth(&[]), 0);
        let nodes = chain(4);
        assert_eq!(depth(&nodes), 4);
        assert_eq!(depth_of(&nodes, "s0.example.com"), Some(1));
        assert_eq!(depth_of(&nodes, "s3.example.com"), Some(4));
        assert_eq!(depth_of(&nodes, "missing.example.com"), None);
    }
}
