//! Status fetcher trait definition
//!
//! This module defines the `StatusFetcher` trait that live status sources
//! implement, plus a fetcher backed by a fixed snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::{StatusError, StatusResult};
use crate::models::LiveStatus;

/// Abstraction over live status sources
///
/// The query string is the server address exactly as stored in the group
/// configuration; results are keyed by it.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Query the status of one server
    ///
    /// # Arguments
    /// * `query` - Server address as stored, optionally with `:port`
    ///
    /// # Errors
    /// Returns `StatusError` if the source cannot be reached or its answer
    /// cannot be parsed
    async fn fetch(&self, query: &str) -> StatusResult<LiveStatus>;

    /// Returns the fetcher identifier
    fn fetcher_id(&self) -> &'static str;
}

/// Answers queries from a fixed map of statuses
///
/// Used for replaying a saved status dump and in tests.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFetcher {
    statuses: HashMap<String, LiveStatus>,
}

impl SnapshotFetcher {
    /// Creates a fetcher answering from `statuses`
    #[must_use]
    pub const fn new(statuses: HashMap<String, LiveStatus>) -> Self {
        Self { statuses }
    }

    /// Parses a JSON object mapping server addresses to status records
    ///
    /// Records are converted one by one; a record that cannot be read becomes
    /// an offline status for its server instead of failing the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::InvalidResponse` if the document is not such an
    /// object.
    pub fn from_json_str(json: &str) -> StatusResult<Self> {
        let raw: HashMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| StatusError::InvalidResponse(format!("Invalid status snapshot: {e}")))?;

        let statuses = raw
            .into_iter()
            .map(|(query, value)| {
                let status = serde_json::from_value(value).unwrap_or_else(|e| {
                    warn!(query = %query, error = %e, "Invalid status record in snapshot");
                    LiveStatus::offline(query.as_str(), format!("invalid status record: {e}"))
                });
                (query, status)
            })
            .collect();
        Ok(Self::new(statuses))
    }

    /// Number of servers in the snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns true if the snapshot holds no servers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[async_trait]
impl StatusFetcher for SnapshotFetcher {
    async fn fetch(&self, query: &str) -> StatusResult<LiveStatus> {
        self.statuses
            .get(query)
            .cloned()
            .ok_or_else(|| StatusError::Request {
                query: query.to_string(),
                reason: "not present in snapshot".to_string(),
            })
    }

    fn fetcher_id(&self) -> &'static str {
        "snapshot"
    }
}
