// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::backend::{CacheBackend, CacheError};

/// 缓存条目
#[derive(Clone)]
struct CacheEntry {
    data: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 进程内缓存后端
///
/// 基于DashMap，过期条目在读取时惰性删除。用于单机部署或测试
#[derive(Default)]
pub struct MemoryBackend {
    cache: DashMap<String, CacheEntry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未过期条目数量
    pub fn len(&self) -> usize {
        self.cache.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取条目剩余存活时间
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.cache
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.ttl.saturating_sub(e.created_at.elapsed()))
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.cache.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.cache.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let entry = CacheEntry::new(value.to_string(), Duration::from_secs(ttl_seconds));
        self.cache.insert(key.to_string(), entry);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        let removed = keys
            .iter()
            .filter(|k| self.cache.remove(k.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .cache
            .iter()
            .filter(|e| e.key().starts_with(prefix) && !e.value().is_expired())
            .map(|e| e.key().clone())
            .collect())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.cache.clear();
        debug!("Cleared all memory cache entries");
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_and_expiry() {
        let backend = MemoryBackend::new();
        backend.set_ex("a", "1", 60).await.unwrap();
        backend.set_ex("b", "2", 0).await.unwrap();

        assert_eq!(backend.get("a").await.unwrap().as_deref(), Some("1"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(backend.get("b").await.unwrap(), None);
        assert!(backend.exists("a").await.unwrap());
        assert!(!backend.exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_prefix_keys_and_delete() {
        let backend = MemoryBackend::new();
        backend.set_ex("scraper:mx:a.com", "x", 60).await.unwrap();
        backend.set_ex("scraper:invalid:b.com", "1", 60).await.unwrap();
        backend.set_ex("other:key", "y", 60).await.unwrap();

        let mut keys = backend.keys_with_prefix("scraper:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["scraper:invalid:b.com", "scraper:mx:a.com"]);

        let removed = backend.del(&keys).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.len(), 1);
    }
}
