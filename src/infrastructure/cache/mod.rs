use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::domain::bulletin::BulletinResponse;

/// Bounded store of recently generated bulletins, keyed by request fingerprint.
/// Concurrent inserts for the same key: last writer wins.
#[async_trait]
pub trait BulletinCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<BulletinResponse>;

    async fn insert(&self, key: String, bulletin: BulletinResponse);
}

pub struct MokaBulletinCache {
    cache: Cache<String, BulletinResponse>,
}

impl MokaBulletinCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl BulletinCache for MokaBulletinCache {
    async fn get(&self, key: &str) -> Option<BulletinResponse> {
        self.cache.get(key).await
    }

    async fn insert(&self, key: String, bulletin: BulletinResponse) {
        self.cache.insert(key, bulletin).await;
    }
}
