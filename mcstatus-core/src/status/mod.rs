//! Live status collection
//!
//! Queries for every server of a group run concurrently, each bounded by its
//! own timeout. A failed or timed-out query never fails the batch; it yields
//! an offline record carrying the reason.

mod fetcher;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::StatusError;
use crate::models::{tree, LiveStatus, ServerNode};

pub use fetcher::{SnapshotFetcher, StatusFetcher};

/// Addresses of every server in a tree, depth-first
#[must_use]
pub fn query_targets(nodes: &[ServerNode]) -> Vec<String> {
    tree::flatten_tree(nodes).into_iter().map(|s| s.ip).collect()
}

/// Fetches the status of every query concurrently
///
/// Duplicate queries are fetched once. Every query appears in the result:
/// errors and timeouts are mapped to [`LiveStatus::offline`].
pub async fn fetch_all<S: AsRef<str> + Sync>(
    fetcher: &dyn StatusFetcher,
    queries: &[S],
    timeout: Duration,
) -> HashMap<String, LiveStatus> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = queries
        .iter()
        .map(|query| query.as_ref())
        .filter(|query| seen.insert(*query))
        .collect();

    debug!(
        fetcher = fetcher.fetcher_id(),
        count = unique.len(),
        "Fetching server statuses"
    );

    let tasks = unique.into_iter().map(|query| async move {
        let status = match tokio::time::timeout(timeout, fetcher.fetch(query)).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                warn!(query, error = %e, "Status query failed");
                LiveStatus::offline(query, e.to_string())
            }
            Err(_) => {
                let e = StatusError::Timeout {
                    query: query.to_string(),
                    seconds: timeout.as_secs(),
                };
                warn!(query, error = %e, "Status query timed out");
                LiveStatus::offline(query, e.to_string())
            }
        };
        (query.to_string(), status)
    });

    join_all(tasks).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusResult;
    use async_trait::async_trait;

    struct SlowFetcher;

    #[async_trait]
    impl StatusFetcher for SlowFetcher {
        async fn fetch(&self, query: &str) -> StatusResult<LiveStatus> {
            if query.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(LiveStatus {
                online: true,
                hostname: Some(query.to_string()),
                ..LiveStatus::default()
            })
        }

        fn fetcher_id(&self) -> &'static str {
            "slow"
        }
    }

    fn online(query: &str) -> LiveStatus {
        LiveStatus {
            online: true,
            hostname: Some(query.to_string()),
            ..LiveStatus::default()
        }
    }

    #[tokio::test]
    async fn test_snapshot_answers_and_misses() {
        let fetcher = SnapshotFetcher::new(HashMap::from([(
            "a.example.com".to_string(),
            online("a.example.com"),
        )]));

        let statuses = fetch_all(
            &fetcher,
            &["a.example.com", "b.example.com"],
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(statuses.len(), 2);
        assert!(statuses["a.example.com"].online);
        let missing = &statuses["b.example.com"];
        assert!(!missing.online);
        assert!(missing.error.as_deref().is_some_and(|e| e.contains("snapshot")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_block_batch() {
        let statuses = fetch_all(
            &SlowFetcher,
            &["fast.example.com", "slow.example.com"],
            Duration::from_secs(2),
        )
        .await;

        assert!(statuses["fast.example.com"].online);
        let slow = &statuses["slow.example.com"];
        assert!(!slow.online);
        assert_eq!(slow.hostname.as_deref(), Some("slow.example.com"));
        assert!(slow.error.as_deref().is_some_and(|e| e.contains("timed out")));
    }

    #[tokio::test]
    async fn test_duplicate_queries_fetched_once() {
        let fetcher = SnapshotFetcher::default();
        let statuses = fetch_all(&fetcher, &["x", "x", "y"], Duration::from_secs(1)).await;
        assert_eq!(statuses.len(), 2);
    }

    #[test]
    fn test_query_targets_cover_whole_tree() {
        let nodes = vec![
            ServerNode::new("a").with_child(ServerNode::new("b")),
            ServerNode::new("c"),
        ];
        assert_eq!(query_targets(&nodes), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_snapshot_from_json() {
        let fetcher = SnapshotFetcher::from_json_str(
            r#"{"a.example.com": {"online": true, "players": {"online": 1, "max": 5}}}"#,
        )
        .unwrap();
        assert_eq!(fetcher.len(), 1);
        assert!(SnapshotFetcher::from_json_str("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn test_bad_snapshot_record_only_affects_its_server() {
        let fetcher = SnapshotFetcher::from_json_str(
            r#"{
                "a.example.com": {"online": true},
                "b.example.com": {"online": "maybe", "players": {"online": 1, "max": 5}},
                "c.example.com": {"online": true, "players": {"online": -1, "max": 0}}
            }"#,
        )
        .unwrap();
        assert_eq!(fetcher.len(), 3);

        let statuses = fetch_all(
            &fetcher,
            &["a.example.com", "b.example.com", "c.example.com"],
            Duration::from_secs(1),
        )
        .await;

        assert!(statuses["a.example.com"].online);
        assert!(statuses["c.example.com"].online);
        let broken = &statuses["b.example.com"];
        assert!(!broken.online);
        assert!(broken.error.as_deref().is_some_and(|e| e.contains("invalid status record")));

        assert!(SnapshotFetcher::from_json_str("[1, 2]").is_err());
    }
}
