// src/config.rs

use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Identifies a configured identity provider (e.g. `apple`, `kakao`).
///
/// Registry lookups and failure reporting are keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Errors raised while assembling a configuration.
///
/// These surface at process start, before any token is handled, and are kept
/// separate from the runtime authentication taxonomy in
/// [`AuthError`](crate::error::AuthError).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("a required configuration field is missing: {0}")]
    MissingConfiguration(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Per-provider verification expectations.
///
/// Built once at startup through [`ProviderConfigBuilder`] and read-only
/// afterwards; every strategy holds its own copy, so no ambient lookup
/// happens inside the verification pipeline.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Registry key for this provider.
    pub provider: ProviderId,
    /// Expected `iss` claim, compared byte-for-byte.
    /// Kept a plain string: URL normalization must not alter the comparison.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Permitted signature algorithms. Tokens declaring any other algorithm
    /// are rejected before signature verification.
    pub algorithms: Vec<Algorithm>,
    /// The provider's published key-set endpoint.
    pub jwks_uri: Url,
    /// Hard bound on each key-set fetch.
    pub fetch_timeout: Duration,
    /// `None` fetches the key set on every call (the baseline); `Some`
    /// enables the time-bounded single-flight cache.
    pub cache_ttl: Option<Duration>,
}

impl ProviderConfig {
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::new()
    }
}

/// A builder for creating a [`ProviderConfig`] instance.
pub struct ProviderConfigBuilder {
    provider: Option<ProviderId>,
    issuer: Option<String>,
    audience: Option<String>,
    algorithms: Vec<Algorithm>,
    jwks_uri: Option<Url>,
    fetch_timeout: Duration,
    cache_ttl: Option<Duration>,
}

impl Default for ProviderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderConfigBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            issuer: None,
            audience: None,
            // RS256 is what the large OIDC providers sign with.
            algorithms: vec![Algorithm::RS256],
            jwks_uri: None,
            fetch_timeout: Duration::from_secs(10),
            cache_ttl: None,
        }
    }

    /// Sets the provider id this configuration belongs to. Required.
    pub fn provider(mut self, provider: impl Into<ProviderId>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the expected `iss` claim. Required.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the expected `aud` claim. Required.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Replaces the algorithm allowlist. Defaults to `[RS256]` if not set.
    pub fn algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Sets the provider's key-set endpoint. Required.
    pub fn jwks_uri(mut self, url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        self.jwks_uri = Some(parsed);
        Ok(self)
    }

    /// Overrides the key-set fetch timeout. Defaults to 10 seconds.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "fetch timeout must be non-zero".to_string(),
            ));
        }
        self.fetch_timeout = timeout;
        Ok(self)
    }

    /// Enables the cached key source with the given TTL. Without this the
    /// key set is fetched fresh on every authentication call.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Consumes the builder and returns a [`ProviderConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required field (`provider`, `issuer`,
    /// `audience`, `jwks_uri`) is missing or the allowlist is empty.
    pub fn build(self) -> Result<ProviderConfig, ConfigError> {
        let provider = self
            .provider
            .ok_or_else(|| ConfigError::MissingConfiguration("provider".to_string()))?;
        let issuer = self
            .issuer
            .ok_or_else(|| ConfigError::MissingConfiguration("issuer".to_string()))?;
        let audience = self
            .audience
            .ok_or_else(|| ConfigError::MissingConfiguration("audience".to_string()))?;
        let jwks_uri = self
            .jwks_uri
            .ok_or_else(|| ConfigError::MissingConfiguration("jwks_uri".to_string()))?;
        if self.algorithms.is_empty() {
            return Err(ConfigError::MissingConfiguration(
                "algorithms".to_string(),
            ));
        }

        Ok(ProviderConfig {
            provider,
            issuer,
            audience,
            algorithms: self.algorithms,
            jwks_uri,
            fetch_timeout: self.fetch_timeout,
            cache_ttl: self.cache_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ProviderConfigBuilder {
        ProviderConfig::builder()
            .provider("apple")
            .issuer("https://appleid.apple.com")
            .audience("app123")
            .jwks_uri("https://appleid.apple.com/auth/keys")
            .unwrap()
    }

    #[test]
    fn builds_with_defaults() {
        let config = minimal().build().unwrap();
        assert_eq!(config.provider.as_str(), "apple");
        assert_eq!(config.algorithms, vec![Algorithm::RS256]);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.cache_ttl.is_none());
    }

    #[test]
    fn rejects_missing_required_field() {
        let result = ProviderConfig::builder()
            .provider("apple")
            .issuer("https://appleid.apple.com")
            .audience("app123")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingConfiguration(field)) if field == "jwks_uri"
        ));
    }

    #[test]
    fn rejects_invalid_jwks_url() {
        let result = ProviderConfig::builder().jwks_uri("not a url");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = minimal().fetch_timeout(Duration::ZERO);
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn rejects_empty_allowlist() {
        let result = minimal().algorithms(Vec::new()).build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingConfiguration(field)) if field == "algorithms"
        ));
    }
}
