// src/cache.rs

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::config::ProviderId;
use crate::error::AuthError;
use crate::fetcher::KeySetFetcher;
use crate::model::JsonWebKeySet;

/// A time-bounded, single-flighted cache in front of a [`KeySetFetcher`].
///
/// Concurrent callers that miss coalesce onto one in-flight fetch
/// (`try_get_with`): at most one request is outstanding per provider, and
/// everyone awaiting it shares the result. Expired entries are evicted
/// without blocking readers of still-valid ones.
#[derive(Clone)]
pub struct CachedKeySource {
    provider: ProviderId,
    fetcher: KeySetFetcher,
    cache: Cache<ProviderId, Arc<JsonWebKeySet>>,
}

impl CachedKeySource {
    pub fn new(provider: ProviderId, fetcher: KeySetFetcher, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(ttl)
            .build();
        Self {
            provider,
            fetcher,
            cache,
        }
    }

    /// Returns the cached key set, fetching on miss.
    pub async fn get(&self) -> Result<Arc<JsonWebKeySet>, AuthError> {
        let fetcher = self.fetcher.clone();
        self.cache
            .try_get_with(self.provider.clone(), async move {
                fetcher.fetch().await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AuthError>| (*e).clone())
    }

    /// Drops the cached entry so the next [`get`](Self::get) fetches fresh
    /// keys. Called after a `KeyNotFound`, which is what a provider key
    /// rotation looks like from here.
    pub async fn invalidate(&self) {
        debug!(provider = %self.provider, "invalidating cached key set");
        self.cache.invalidate(&self.provider).await;
    }
}
