// src/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ProviderId;
use crate::error::{AuthError, AuthenticationFailure};
use crate::model::VerifiedIdentity;
use crate::strategy::AuthenticationStrategy;

/// Maps provider ids to their authentication strategies.
///
/// Built once at process start and read-only afterwards, so lookups can
/// never race a registration. The caller selects a strategy by provider id
/// and invokes it uniformly; it never branches on the concrete type.
pub struct StrategyRegistry {
    strategies: HashMap<ProviderId, Arc<dyn AuthenticationStrategy>>,
}

impl StrategyRegistry {
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder {
            strategies: HashMap::new(),
        }
    }

    /// Looks up the strategy registered for `provider`.
    pub fn resolve(
        &self,
        provider: &ProviderId,
    ) -> Result<Arc<dyn AuthenticationStrategy>, AuthenticationFailure> {
        self.strategies.get(provider).cloned().ok_or_else(|| {
            warn!(provider = %provider, "no authentication strategy registered");
            AuthenticationFailure::new(
                provider.clone(),
                AuthError::UnsupportedProvider {
                    provider: provider.clone(),
                },
            )
        })
    }

    /// Resolves and invokes in one step.
    pub async fn authenticate(
        &self,
        provider: &ProviderId,
        raw_token: &str,
    ) -> Result<VerifiedIdentity, AuthenticationFailure> {
        self.resolve(provider)?.authenticate(raw_token).await
    }

    /// The provider ids with a registered strategy.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderId> {
        self.strategies.keys()
    }
}

/// Collects strategies at startup; [`build`](Self::build) freezes the map.
pub struct StrategyRegistryBuilder {
    strategies: HashMap<ProviderId, Arc<dyn AuthenticationStrategy>>,
}

impl StrategyRegistryBuilder {
    /// Registers a strategy under its own provider id. The last
    /// registration for an id wins.
    pub fn register(mut self, strategy: Arc<dyn AuthenticationStrategy>) -> Self {
        let id = strategy.provider_id().clone();
        debug!(provider = %id, "registered authentication strategy");
        self.strategies.insert(id, strategy);
        self
    }

    pub fn build(self) -> StrategyRegistry {
        StrategyRegistry {
            strategies: self.strategies,
        }
    }
}
