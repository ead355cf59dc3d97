//! Revocation set for tokens invalidated before their natural expiry
//!
//! Entries remember the expiry of the token they block so that a scheduled
//! job can drop them once the token would have been rejected anyway.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::TokenError;

/// Set of revoked token strings, shared by every clone
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    /// Token string -> expiry (unix seconds) of that token
    entries: Arc<Mutex<HashMap<String, u64>>>,
}

impl RevocationList {
    /// Create an empty revocation list
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a token string has been revoked
    pub async fn contains(&self, token: &str) -> bool {
        self.entries.lock().await.contains_key(token)
    }

    /// Revoke a token string
    ///
    /// Revoking the same string twice fails with `AlreadyRevoked`.
    pub async fn insert(&self, token: &str, expires_at: u64) -> Result<(), TokenError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(token) {
            return Err(TokenError::AlreadyRevoked);
        }
        entries.insert(token.to_string(), expires_at);
        Ok(())
    }

    /// Drop every entry whose token expired before `now`
    ///
    /// Returns the number of entries removed.
    pub async fn compact(&self, now: u64) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        before - entries.len()
    }

    /// Number of tokens currently revoked
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no token is currently revoked
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Start a cron job compacting the list on the given schedule
    ///
    /// The returned scheduler must be kept alive for the job to keep running.
    pub async fn start_compaction(&self, schedule: &str) -> Result<JobScheduler> {
        let list = self.clone();
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let list = list.clone();
            Box::pin(async move {
                let removed = list.compact(jsonwebtoken::get_current_timestamp()).await;
                if removed > 0 {
                    info!("Compacted revocation list, dropped {} expired entries", removed);
                }
            })
        })
        .map_err(|e| {
            error!("Invalid revocation compaction schedule {}: {}", schedule, e);
            e
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started revocation compaction with schedule: {}", schedule);
        Ok(scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_contains() {
        let list = RevocationList::new();
        assert!(!list.contains("abc").await);

        list.insert("abc", 100).await.unwrap();
        assert!(list.contains("abc").await);
        assert!(!list.contains("abd").await);
    }

    #[tokio::test]
    async fn test_double_insert_fails() {
        let list = RevocationList::new();
        list.insert("abc", 100).await.unwrap();
        assert_eq!(
            list.insert("abc", 100).await,
            Err(TokenError::AlreadyRevoked)
        );
        assert_eq!(list.len().await, 1);
    }

    #[tokio::test]
    async fn test_compact_drops_only_expired_entries() {
        let list = RevocationList::new();
        list.insert("expired", 50).await.unwrap();
        list.insert("live", 500).await.unwrap();

        assert_eq!(list.compact(100).await, 1);
        assert!(!list.contains("expired").await);
        assert!(list.contains("live").await);
        assert_eq!(list.compact(100).await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let list = RevocationList::new();
        let other = list.clone();
        other.insert("abc", 100).await.unwrap();
        assert!(list.contains("abc").await);
    }

    #[tokio::test]
    async fn test_concurrent_revocation_of_same_token_succeeds_once() {
        let list = RevocationList::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let list = list.clone();
                tokio::spawn(async move { list.insert("shared", 100).await.is_ok() })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(list.len().await, 1);
    }
}
