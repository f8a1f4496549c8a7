//! In-process TTL cache standing in for the shared cache tier.
//!
//! Entries expire lazily on read; `purge_expired` drops the rest.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{CacheError, CacheTier};

/// Longest lifetime actually applied; larger TTLs are clamped to it.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct InMemoryCacheTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_TTL))
        .or_else(|| now.checked_add(ttl))
        .unwrap_or(now)
}

#[async_trait]
impl CacheTier for InMemoryCacheTier {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }

        // expired: re-check under the write lock, a concurrent set may have refreshed it
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| Instant::now() >= entry.expires_at)
        {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: expiry(Instant::now(), ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        // テスト項目: TTL 内であれば set した値を取得できる
        // given (前提条件):
        let cache = InMemoryCacheTier::new();
        cache
            .set("messages:recent", "[]".to_string(), Duration::from_secs(30))
            .await
            .unwrap();

        // when (操作):
        let value = cache.get("messages:recent").await.unwrap();

        // then (期待する結果):
        assert_eq!(value, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        // テスト項目: TTL を過ぎたエントリは取得できず削除される
        // given (前提条件):
        let cache = InMemoryCacheTier::new();
        cache
            .set("session:abc", "{}".to_string(), Duration::from_millis(10))
            .await
            .unwrap();

        // when (操作):
        tokio::time::sleep(Duration::from_millis(30)).await;
        let value = cache.get("session:abc").await.unwrap();

        // then (期待する結果):
        assert_eq!(value, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_del_removes_entry() {
        // テスト項目: del したキーは取得できない（存在しないキーの del もエラーにならない）
        // given (前提条件):
        let cache = InMemoryCacheTier::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(30))
            .await
            .unwrap();

        // when (操作):
        cache.del("k").await.unwrap();
        let missing = cache.del("never-set").await;

        // then (期待する結果):
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(missing.is_ok());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        // テスト項目: purge_expired は期限切れのエントリだけを削除する
        // given (前提条件):
        let cache = InMemoryCacheTier::new();
        cache
            .set("short", "1".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set("long", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // when (操作):
        let purged = cache.purge_expired().await;

        // then (期待する結果):
        assert_eq!(purged, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("long").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        // テスト項目: 非常に大きな TTL でも set がパニックせず、値は期限切れにならない
        // given (前提条件):
        let cache = InMemoryCacheTier::new();

        // when (操作):
        let result = cache.set("k", "v".to_string(), Duration::MAX).await;
        let purged = cache.purge_expired().await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(purged, 0);
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }
}
