//! Positional array form of group records
//!
//! A server node becomes
//! `[ip, comment|0, tag|0, tag_color|0, ignore_in_list, hide_ip, display_name|0,
//! children|0, priority?]`
//! and a group becomes `[footer|0, show_offline_by_default, servers]`.
//! Empty strings and empty child lists are written as `0`, flags as `0`/`1`.
//! The trailing `priority` is only written when it differs from the default.
//! On decode, positions past the end of an array take their defaults.

use serde_json::{json, Value};

use crate::error::{CodecError, CodecResult};
use crate::models::tree::MAX_TREE_DEPTH;
use crate::models::{GroupConfig, ServerNode, DEFAULT_SERVER_PRIORITY};

const S_IP: usize = 0;
const S_COMMENT: usize = 1;
const S_TAG: usize = 2;
const S_TAG_COLOR: usize = 3;
const S_IGNORE: usize = 4;
const S_HIDE_IP: usize = 5;
const S_DISPLAY_NAME: usize = 6;
const S_CHILDREN: usize = 7;
const S_PRIORITY: usize = 8;

const G_FOOTER: usize = 0;
const G_SHOW_OFFLINE: usize = 1;
const G_SERVERS: usize = 2;

/// Converts a group record to its positional array
#[must_use]
pub fn group_to_array(config: &GroupConfig) -> Value {
    json!([
        text_or_zero(&config.footer),
        flag(config.show_offline_by_default),
        nodes_to_array(&config.servers),
    ])
}

/// Rebuilds a group record from its positional array
///
/// # Errors
///
/// Returns `CodecError::Shape` if the value is not an array of at least
/// three entries or any position holds the wrong kind of value.
pub fn group_from_array(value: &Value) -> CodecResult<GroupConfig> {
    let Value::Array(items) = value else {
        return Err(CodecError::Shape("group must be an array".to_string()));
    };
    if items.len() <= G_SERVERS {
        return Err(CodecError::Shape(format!(
            "group array has {} entries, expected at least 3",
            items.len()
        )));
    }

    Ok(GroupConfig {
        footer: text_at(items, G_FOOTER, "footer")?,
        show_offline_by_default: flag_at(items, G_SHOW_OFFLINE, "show_offline")?,
        servers: nodes_from_value(&items[G_SERVERS], "servers", 1)?,
    })
}

fn nodes_to_array(nodes: &[ServerNode]) -> Value {
    Value::Array(nodes.iter().map(node_to_array).collect())
}

fn node_to_array(node: &ServerNode) -> Value {
    let children = if node.children.is_empty() {
        json!(0)
    } else {
        nodes_to_array(&node.children)
    };

    let mut fields = vec![
        Value::String(node.ip.clone()),
        text_or_zero(&node.comment),
        text_or_zero(&node.tag),
        text_or_zero(&node.tag_color),
        flag(node.ignore_in_list),
        flag(node.hide_ip),
        text_or_zero(&node.display_name),
        children,
    ];
    if node.priority != DEFAULT_SERVER_PRIORITY {
        fields.push(json!(node.priority));
    }
    Value::Array(fields)
}

/// Decodes the servers of one tree level, `level` being 1 for root servers
fn nodes_from_value(value: &Value, context: &str, level: usize) -> CodecResult<Vec<ServerNode>> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(_) if level > MAX_TREE_DEPTH => Err(CodecError::Shape(format!(
            "{context} are nested deeper than {MAX_TREE_DEPTH} levels"
        ))),
        Value::Array(items) => items
            .iter()
            .map(|item| node_from_value(item, level))
            .collect(),
        Value::Null => Ok(Vec::new()),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(Vec::new()),
        other => Err(CodecError::Shape(format!(
            "{context} must be an array, got {other}"
        ))),
    }
}

fn node_from_value(value: &Value, level: usize) -> CodecResult<ServerNode> {
    let Value::Array(items) = value else {
        return Err(CodecError::Shape(format!("server must be an array, got {value}")));
    };

    let ip = match items.get(S_IP) {
        Some(Value::String(ip)) if !ip.trim().is_empty() => ip.clone(),
        _ => return Err(CodecError::Shape("server is missing its address".to_string())),
    };

    let children = match items.get(S_CHILDREN) {
        Some(value) => nodes_from_value(value, &format!("children of {ip}"), level + 1)?,
        None => Vec::new(),
    };

    let priority = match items.get(S_PRIORITY) {
        None | Some(Value::Null) => DEFAULT_SERVER_PRIORITY,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            CodecError::Shape(format!("priority of {ip} must be an integer"))
        })?,
        Some(other) => {
            return Err(CodecError::Shape(format!(
                "priority of {ip} must be an integer, got {other}"
            )))
        }
    };

    Ok(ServerNode {
        comment: text_at(items, S_COMMENT, "comment")?,
        tag: text_at(items, S_TAG, "tag")?,
        tag_color: text_at(items, S_TAG_COLOR, "tag_color")?,
        ignore_in_list: flag_at(items, S_IGNORE, "ignore_in_list")?,
        hide_ip: flag_at(items, S_HIDE_IP, "hide_ip")?,
        display_name: text_at(items, S_DISPLAY_NAME, "display_name")?,
        priority,
        children,
        ip,
    })
}

fn text_or_zero(text: &str) -> Value {
    if text.is_empty() {
        json!(0)
    } else {
        Value::String(text.to_string())
    }
}

fn flag(value: bool) -> Value {
    json!(u8::from(value))
}

/// Reads a string position; `0`, `false`, `null` and a missing tail are empty
fn text_at(items: &[Value], index: usize, field: &str) -> CodecResult<String> {
    match items.get(index) {
        None | Some(Value::Null | Value::Bool(false)) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(String::new()),
        Some(other) => Err(CodecError::Shape(format!(
            "{field} must be a string or 0, got {other}"
        ))),
    }
}

/// Reads a flag position; only `1` and `true` are set
fn flag_at(items: &[Value], index: usize, field: &str) -> CodecResult<bool> {
    match items.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_i64() == Some(1)),
        Some(other) => Err(CodecError::Shape(format!(
            "{field} must be 0 or 1, got {other}"
        ))),
    }
}
