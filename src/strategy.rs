// src/strategy.rs

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::cache::CachedKeySource;
use crate::claims;
use crate::config::{ConfigError, ProviderConfig, ProviderId};
use crate::error::{AuthError, AuthenticationFailure};
use crate::fetcher::KeySetFetcher;
use crate::model::{JsonWebKeySet, VerifiedIdentity};
use crate::verifier;

/// The uniform contract every provider implementation satisfies.
///
/// Callers resolve a strategy through the
/// [`StrategyRegistry`](crate::registry::StrategyRegistry) and invoke it
/// without knowing the concrete pipeline behind it — public-key
/// verification and opaque-token introspection sit behind the same two
/// methods.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// The provider this strategy authenticates against.
    fn provider_id(&self) -> &ProviderId;

    /// Proves that `raw_token` was issued by this provider for the
    /// configured audience and is still valid.
    ///
    /// Each call is independent; no state is retained across calls, and a
    /// failure in any step short-circuits the whole call.
    async fn authenticate(
        &self,
        raw_token: &str,
    ) -> Result<VerifiedIdentity, AuthenticationFailure>;
}

/// Epoch-seconds clock, injected so expiry boundaries are testable.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> u64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Where the pipeline gets its keys: a fresh fetch per call, or the
/// time-bounded cache.
enum KeyStore {
    Fresh(KeySetFetcher),
    Cached(CachedKeySource),
}

impl KeyStore {
    async fn get(&self) -> Result<Arc<JsonWebKeySet>, AuthError> {
        match self {
            KeyStore::Fresh(fetcher) => fetcher.fetch().await.map(Arc::new),
            KeyStore::Cached(cache) => cache.get().await,
        }
    }

    /// A second chance after `KeyNotFound`. Only the cached store can be
    /// serving a set that predates a provider key rotation; the fresh
    /// store just fetched, so a retry would learn nothing.
    async fn refetch_after_rotation(&self) -> Option<Result<Arc<JsonWebKeySet>, AuthError>> {
        match self {
            KeyStore::Fresh(_) => None,
            KeyStore::Cached(cache) => {
                cache.invalidate().await;
                Some(cache.get().await)
            }
        }
    }
}

/// Public-key verification pipeline for OIDC-style providers (Apple
/// sign-in and the like): fetch the provider's keys, select by the token's
/// `kid`, verify the signature, validate the claims.
pub struct OidcStrategy {
    config: ProviderConfig,
    keys: KeyStore,
    clock: Arc<dyn Clock>,
}

impl OidcStrategy {
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        let fetcher = KeySetFetcher::new(config.jwks_uri.clone(), config.fetch_timeout)?;
        let keys = match config.cache_ttl {
            Some(ttl) => KeyStore::Cached(CachedKeySource::new(
                config.provider.clone(),
                fetcher,
                ttl,
            )),
            None => KeyStore::Fresh(fetcher),
        };
        Ok(Self {
            config,
            keys,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock. Tests use this to pin `now` and assert the
    /// expiry boundary exactly.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn run_pipeline(&self, raw_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let (_, kid) = verifier::decode_unverified_header(raw_token)?;
        // A keyed pipeline cannot select without a kid; such a token is
        // structurally unusable here.
        let kid = kid.ok_or(AuthError::MalformedToken)?;

        let key_set = self.keys.get().await?;
        let key = match key_set.select(&kid) {
            Ok(key) => key.clone(),
            Err(AuthError::KeyNotFound { .. }) => match self.keys.refetch_after_rotation().await {
                Some(fresh_set) => {
                    debug!(provider = %self.config.provider, kid = %kid, "kid missing from cached set, retrying against fresh keys");
                    fresh_set?.select(&kid)?.clone()
                }
                None => return Err(AuthError::KeyNotFound { kid }),
            },
            Err(other) => return Err(other),
        };

        let claims = verifier::verify(raw_token, &key, &self.config.algorithms)?;
        claims::validate(&claims, &self.config, self.clock.now_epoch_secs())?;

        Ok(VerifiedIdentity::new(
            self.config.provider.clone(),
            claims.sub,
        ))
    }
}

#[async_trait]
impl AuthenticationStrategy for OidcStrategy {
    fn provider_id(&self) -> &ProviderId {
        &self.config.provider
    }

    #[instrument(skip(self, raw_token), fields(provider = %self.config.provider))]
    async fn authenticate(
        &self,
        raw_token: &str,
    ) -> Result<VerifiedIdentity, AuthenticationFailure> {
        self.run_pipeline(raw_token).await.map_err(|kind| {
            // The detailed kind goes to telemetry; the returned failure
            // stays opaque for untrusted-facing responses.
            warn!(provider = %self.config.provider, kind = %kind, "authentication failed");
            AuthenticationFailure::new(self.config.provider.clone(), kind)
        })
    }
}
