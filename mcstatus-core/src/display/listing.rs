//! Plain-text listing of a stored server tree.

use crate::models::ServerNode;

/// Renders the tree one server per line, children indented under parents
///
/// Each line is `[tag] comment (ip)`, dropping the tag prefix when there is
/// no tag and showing only the address when there is no comment. Nested
/// lines are indented two spaces per level and prefixed with `↳ `.
#[must_use]
pub fn format_tree_listing(nodes: &[ServerNode]) -> String {
    let mut lines = Vec::new();
    push_lines(nodes, 0, &mut lines);
    lines.join("\n")
}

fn push_lines(nodes: &[ServerNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        let connector = if depth > 0 { "↳ " } else { "" };
        let prefix = if node.tag.is_empty() {
            String::new()
        } else {
            format!("[{}] ", node.tag)
        };
        let label = if node.comment.is_empty() {
            node.ip.clone()
        } else {
            format!("{} ({})", node.comment, node.ip)
        };

        lines.push(format!("{indent}{connector}{prefix}{label}"));
        push_lines(&node.children, depth + 1, lines);
    }
}
