//! Input validation for values arriving from the command layer
//!
//! Server addresses, tag colours and boolean words are checked here before
//! they reach the store, so a rejected value never causes a write.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

/// Domains that may never be added as a server address
const BLACKLISTED_SUFFIXES: &[&str] = &["gov.cn", "mil.cn"];

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{6}$").expect("Invalid regex pattern"));

/// Returns true for a six digit hex colour code (case-insensitive, no `#`)
#[must_use]
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color.trim())
}

/// Normalises a user supplied colour to the stored form
///
/// Strips surrounding whitespace and one leading `#`, then uppercases.
/// Returns `None` if the result is not a six digit hex code.
#[must_use]
pub fn normalize_hex_color(color: &str) -> Option<String> {
    let trimmed = color.trim();
    let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);
    is_valid_hex_color(bare).then(|| bare.to_ascii_uppercase())
}

/// Parses a yes/no word as typed in chat
///
/// Accepts `true/1/yes/y/是` and `false/0/no/n/否`, case-insensitive.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "是" => Some(true),
        "false" | "0" | "no" | "n" | "否" => Some(false),
        _ => None,
    }
}

/// Checks that a string is a plausible game server address
///
/// Accepts domain names, IPv4 and IPv6 addresses, each with an optional
/// `:port` (IPv6 must be bracketed to carry a port). Blacklisted domains and
/// their subdomains are rejected.
#[must_use]
pub fn is_valid_server_address(address: &str) -> bool {
    let address = address.trim();
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((host, port)) = split_host_port(address) else {
        return false;
    };

    if let Some(port) = port {
        match port.parse::<u32>() {
            Ok(p) if (1..=65535).contains(&p) => {}
            _ => return false,
        }
    }

    if host.is_empty() {
        return false;
    }

    let host_lower = host.to_lowercase();
    if BLACKLISTED_SUFFIXES
        .iter()
        .any(|suffix| host_lower == *suffix || host_lower.ends_with(&format!(".{suffix}")))
    {
        return false;
    }

    if host.parse::<IpAddr>().is_ok() {
        return true;
    }

    is_valid_hostname(&host_lower)
}

/// Splits `host[:port]` / `[v6][:port]` / bare IPv6
///
/// Returns `None` for malformed bracket syntax.
fn split_host_port(address: &str) -> Option<(&str, Option<&str>)> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        if after.is_empty() {
            return Some((host, None));
        }
        let port = after.strip_prefix(':')?;
        return Some((host, (!port.is_empty()).then_some(port)));
    }

    // More than one colon without brackets can only be a bare IPv6 address
    if address.matches(':').count() > 1 {
        return Some((address, None));
    }

    match address.split_once(':') {
        Some((host, port)) => Some((host, (!port.is_empty()).then_some(port))),
        None => Some((address, None)),
    }
}

fn is_valid_hostname(host: &str) -> bool {
    if host.len() > MAX_HOSTNAME_LEN
        || host.starts_with('-')
        || host.ends_with('-')
        || host.starts_with('.')
        || host.ends_with('.')
        || host.contains("..")
    {
        return false;
    }

    let labels_ok = host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    });
    if !labels_ok {
        return false;
    }

    host == "localhost" || host.contains('.')
}
