use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaObjectCache);

/// 每个条目携带自己的 TTL
struct PerEntryTtl;

impl Expiry<String, (String, Duration)> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

pub struct MokaObjectCache {
    inner: Cache<String, (String, Duration)>,
    default_ttl: Duration,
}

impl MokaObjectCache {
    pub async fn new() -> Result<Self, String> {
        let config = &AppConfig::get().cache;
        Ok(Self::with_capacity(
            config.memory.max_capacity,
            Duration::from_secs(config.default_ttl),
        ))
    }

    pub fn with_capacity(max_capacity: u64, default_ttl: Duration) -> Self {
        debug!(
            "Moka cache initialized (capacity {}, default TTL {:?})",
            max_capacity, default_ttl
        );
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
            default_ttl,
        }
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some((value, _)) => CacheResult::Found(value),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let ttl = if ttl == 0 {
            self.default_ttl
        } else {
            Duration::from_secs(ttl)
        };
        self.inner.insert(key, (value, ttl)).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaObjectCache::with_capacity(16, Duration::from_secs(60));
        cache.insert_raw("user:1".into(), "alice".into(), 0).await;

        assert_eq!(
            cache.get_raw("user:1").await,
            CacheResult::Found("alice".to_string())
        );
        cache.remove("user:1").await;
        assert_eq!(cache.get_raw("user:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache: Box<dyn ObjectCache> =
            Box::new(MokaObjectCache::with_capacity(16, Duration::from_secs(60)));
        cache.insert_json("k".into(), &vec![1, 2, 3], 5).await;
        assert_eq!(cache.get_json::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));

        cache.insert_raw("bad".into(), "{not json".into(), 5).await;
        assert_eq!(cache.get_json::<Vec<i32>>("bad").await, None);
        assert_eq!(cache.get_raw("bad").await, CacheResult::NotFound);
    }
}
