//! Time-to-live cache in front of another key set source.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{JsonWebKeySet, KeySetSource};
use crate::error::Error;

struct CachedEntry {
    key_set: JsonWebKeySet,
    fetched_at: Instant,
}

/// Caches key sets per domain for `ttl`.
///
/// Concurrent misses are not deduplicated: each one fetches from the inner
/// source and the last writer wins.
pub struct CachedKeySet<S: KeySetSource> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl<S: KeySetSource> CachedKeySet<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every cached key set.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl<S: KeySetSource> KeySetSource for CachedKeySet<S> {
    async fn key_set(&self, domain: &str) -> Result<JsonWebKeySet, Error> {
        if let Some(entry) = self.entries.read().await.get(domain) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.key_set.clone());
            }
        }

        debug!("Key set cache miss for {}", domain);

        let key_set = self.inner.key_set(domain).await?;
        self.entries.write().await.insert(
            domain.to_string(),
            CachedEntry {
                key_set: key_set.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(key_set)
    }
}
