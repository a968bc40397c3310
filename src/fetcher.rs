// src/fetcher.rs

use std::time::Duration;

use tracing::{info, instrument};
use url::Url;

use crate::config::ConfigError;
use crate::error::AuthError;
use crate::model::JsonWebKeySet;

/// Fetches a provider's current set of public signing keys.
///
/// One fetch per call, no retry and no cache: retry policy belongs to the
/// caller, caching to [`CachedKeySource`](crate::cache::CachedKeySource).
/// Every request runs under the configured timeout so an unresponsive
/// provider cannot block an authentication call indefinitely.
#[derive(Clone)]
pub struct KeySetFetcher {
    http: reqwest::Client,
    jwks_uri: Url,
}

impl KeySetFetcher {
    pub fn new(jwks_uri: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { http, jwks_uri })
    }

    /// Retrieves and defensively decodes the key set.
    ///
    /// The endpoint schema is provider-defined: unknown fields and unknown
    /// key types are tolerated, but a non-2xx answer, an undeserializable
    /// body, an empty key list, or a known-type key missing its required
    /// material all fail as [`AuthError::KeySetUnavailable`].
    #[instrument(skip(self), fields(uri = %self.jwks_uri), err)]
    pub async fn fetch(&self) -> Result<JsonWebKeySet, AuthError> {
        let response = self
            .http
            .get(self.jwks_uri.clone())
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "key-set endpoint answered HTTP {status}"
            )));
        }

        let key_set: JsonWebKeySet = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("malformed key-set response: {e}")))?;

        if key_set.keys.is_empty() {
            return Err(AuthError::KeySetUnavailable(
                "key-set response contains no keys".to_string(),
            ));
        }
        if let Some(bad) = key_set
            .keys
            .iter()
            .find(|key| matches!(key.kty.as_str(), "RSA" | "EC") && !key.is_usable())
        {
            return Err(AuthError::KeySetUnavailable(format!(
                "key `{}` is missing required material for type `{}`",
                bad.kid, bad.kty
            )));
        }

        info!(count = key_set.keys.len(), "fetched provider key set");
        Ok(key_set)
    }
}
