//! Named server attributes for the command layer
//!
//! Commands address attributes by string name (`/mcs set <ip> tag Lobby`).
//! Only the names listed in [`ServerAttribute`] can be read, set or cleared;
//! the identity field `ip` is deliberately absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::server::{ServerNode, DEFAULT_SERVER_PRIORITY};
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{normalize_hex_color, parse_flag};

/// Name of the identity field, which is never mutable through attributes
pub const IDENTITY_FIELD: &str = "ip";

/// A mutable server attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAttribute {
    /// Free-text label
    Comment,
    /// Badge label
    Tag,
    /// Badge colour
    TagColor,
    /// Exclude from listings
    IgnoreInList,
    /// Sort priority
    Priority,
    /// Hide the raw address
    HideIp,
    /// Replacement name for the address
    DisplayName,
}

/// Value of a server attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text attributes
    Text(String),
    /// Boolean attributes
    Flag(bool),
    /// Integer attributes
    Number(i64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl ServerAttribute {
    /// Returns every attribute in declaration order
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Comment,
            Self::Tag,
            Self::TagColor,
            Self::IgnoreInList,
            Self::Priority,
            Self::HideIp,
            Self::DisplayName,
        ]
    }

    /// Returns the attribute's persisted field name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Tag => "tag",
            Self::TagColor => "tag_color",
            Self::IgnoreInList => "ignore_in_list",
            Self::Priority => "priority",
            Self::HideIp => "hide_ip",
            Self::DisplayName => "display_name",
        }
    }

    /// Looks an attribute up by name, case-insensitively
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::all().iter().copied().find(|a| a.as_str() == name)
    }

    /// Comma separated list of accepted names, for help text
    #[must_use]
    pub fn names() -> String {
        Self::all()
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses a raw command argument into a value of the right kind
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for a non-integer priority, an
    /// unrecognised yes/no word, or a colour that is not six hex digits.
    pub fn parse_value(&self, raw: &str) -> ConfigResult<AttributeValue> {
        match self {
            Self::Priority => raw
                .trim()
                .parse::<i64>()
                .map(AttributeValue::Number)
                .map_err(|_| ConfigError::validation(self.as_str(), "priority must be an integer")),
            Self::IgnoreInList | Self::HideIp => parse_flag(raw)
                .map(AttributeValue::Flag)
                .ok_or_else(|| {
                    ConfigError::validation(self.as_str(), "value must be true or false")
                }),
            Self::TagColor => normalize_hex_color(raw).map(AttributeValue::Text).ok_or_else(|| {
                ConfigError::validation(self.as_str(), "colour must be six hex digits, e.g. FF00AA")
            }),
            Self::Comment | Self::Tag | Self::DisplayName => {
                Ok(AttributeValue::Text(raw.to_string()))
            }
        }
    }

    /// Checks a typed value against this attribute's kind and normalises it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the kind does not match or the
    /// colour is malformed.
    pub fn validate(&self, value: AttributeValue) -> ConfigResult<AttributeValue> {
        match (self, value) {
            (Self::TagColor, AttributeValue::Text(color)) => {
                if color.is_empty() {
                    return Ok(AttributeValue::Text(color));
                }
                normalize_hex_color(&color).map(AttributeValue::Text).ok_or_else(|| {
                    ConfigError::validation(self.as_str(), "colour must be six hex digits")
                })
            }
            (Self::Comment | Self::Tag | Self::DisplayName, v @ AttributeValue::Text(_))
            | (Self::IgnoreInList | Self::HideIp, v @ AttributeValue::Flag(_))
            | (Self::Priority, v @ AttributeValue::Number(_)) => Ok(v),
            (attr, other) => Err(ConfigError::validation(
                attr.as_str(),
                format!("unexpected value {other:?}"),
            )),
        }
    }

    /// Reads this attribute from a node
    #[must_use]
    pub fn get(&self, node: &ServerNode) -> AttributeValue {
        match self {
            Self::Comment => AttributeValue::Text(node.comment.clone()),
            Self::Tag => AttributeValue::Text(node.tag.clone()),
            Self::TagColor => AttributeValue::Text(node.tag_color.clone()),
            Self::DisplayName => AttributeValue::Text(node.display_name.clone()),
            Self::IgnoreInList => AttributeValue::Flag(node.ignore_in_list),
            Self::HideIp => AttributeValue::Flag(node.hide_ip),
            Self::Priority => AttributeValue::Number(node.priority),
        }
    }

    /// Writes an already validated value into a node
    ///
    /// A value of the wrong kind is ignored; callers pass values through
    /// [`ServerAttribute::validate`] first.
    pub fn apply(&self, node: &mut ServerNode, value: AttributeValue) {
        match (self, value) {
            (Self::Comment, AttributeValue::Text(s)) => node.comment = s,
            (Self::Tag, AttributeValue::Text(s)) => node.tag = s,
            (Self::TagColor, AttributeValue::Text(s)) => node.tag_color = s,
            (Self::DisplayName, AttributeValue::Text(s)) => node.display_name = s,
            (Self::IgnoreInList, AttributeValue::Flag(b)) => node.ignore_in_list = b,
            (Self::HideIp, AttributeValue::Flag(b)) => node.hide_ip = b,
            (Self::Priority, AttributeValue::Number(n)) => node.priority = n,
            (attr, value) => {
                tracing::warn!(
                    attribute = attr.as_str(),
                    ?value,
                    "Ignoring mismatched attribute value"
                );
            }
        }
    }

    /// Resets this attribute on a node to its default
    pub fn clear(&self, node: &mut ServerNode) {
        match self {
            Self::Comment => node.comment.clear(),
            Self::Tag => node.tag.clear(),
            Self::TagColor => node.tag_color.clear(),
            Self::DisplayName => node.display_name.clear(),
            Self::IgnoreInList => node.ignore_in_list = false,
            Self::HideIp => node.hide_ip = false,
            Self::Priority => node.priority = DEFAULT_SERVER_PRIORITY,
        }
    }
}

impl fmt::Display for ServerAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerAttribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            ConfigError::validation(
                "attribute",
                format!("unsupported attribute '{s}', expected one of: {}", Self::names()),
            )
        })
    }
}
