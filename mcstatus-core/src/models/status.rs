//! Live server status as reported by the status query service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// UUID the status service reports for players hidden by the server
pub const ANONYMOUS_PLAYER_ID: &str = "00000000-0000-0000-0000-000000000000";
/// Name the status service reports for players hidden by the server
pub const ANONYMOUS_PLAYER_NAME: &str = "Anonymous Player";

/// One player from the sample list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    /// Player UUID as reported
    #[serde(default)]
    pub id: String,
    /// Player name
    #[serde(default)]
    pub name: String,
}

impl PlayerSample {
    /// Returns true for the placeholder entry servers use for hidden players
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_PLAYER_ID && self.name == ANONYMOUS_PLAYER_NAME
    }
}

/// Player counts and sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    /// Players currently online; some proxies report `-1` when hidden
    #[serde(default, deserialize_with = "count_from_number_or_string")]
    pub online: i64,
    /// Server slot count
    #[serde(default, deserialize_with = "count_from_number_or_string")]
    pub max: i64,
    /// Subset of online players
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Vec<PlayerSample>>,
}

/// Server description (MOTD)
///
/// The service sends either a plain string or an object carrying a plain
/// text rendering and an HTML rendering with colour codes applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Motd {
    /// Plain description string
    Plain(String),
    /// Structured description
    Rich {
        /// Plain text form
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// HTML form
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },
}

impl Motd {
    /// Best available plain text
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s),
            Self::Rich { text, .. } => text.as_deref(),
        }
    }
}

/// Status of one server at query time
///
/// Unknown fields in the service response are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    /// Whether the server answered the status ping
    #[serde(default)]
    pub online: bool,
    /// Resolved host name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Resolved port
    #[serde(
        default,
        deserialize_with = "port_from_number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,
    /// Player information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Players>,
    /// Server description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Motd>,
    /// Version name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base64 data URI of the server icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Round-trip time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<f64>,
    /// Failure reason for offline or unreachable servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LiveStatus {
    /// Builds the fallback record used when a query for `query` fails
    #[must_use]
    pub fn offline(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            online: false,
            hostname: Some(query.into()),
            port: Some(0),
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Players currently online, zero when unknown
    #[must_use]
    pub fn players_online(&self) -> i64 {
        self.players.as_ref().map_or(0, |p| p.online)
    }

    /// True when the server is online with players and a non-empty sample
    #[must_use]
    pub fn has_active_players(&self) -> bool {
        self.online
            && self.players.as_ref().is_some_and(|p| {
                p.online > 0 && p.sample.as_ref().is_some_and(|s| !s.is_empty())
            })
    }

    /// Removes anonymous placeholder entries from the player sample
    pub fn scrub_anonymous_players(&mut self) {
        if !self.online {
            return;
        }
        if let Some(sample) = self.players.as_mut().and_then(|p| p.sample.as_mut()) {
            sample.retain(|player| !player.is_anonymous());
        }
    }
}

/// Ports arrive as numbers from most servers but as strings from some
fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Player counts are integers from vanilla servers, anything from proxies
fn count_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}
