// src/introspection.rs

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ConfigError, ProviderId};
use crate::error::{AuthError, AuthenticationFailure};
use crate::model::VerifiedIdentity;
use crate::strategy::AuthenticationStrategy;

/// Strategy for providers whose tokens are opaque rather than locally
/// verifiable (Kakao-style): the bearer token is proven by presenting it
/// to the provider's userinfo endpoint, making the provider itself the
/// verifier. Sits behind the same contract as the public-key pipeline.
pub struct IntrospectionStrategy {
    provider: ProviderId,
    userinfo_uri: Url,
    http: reqwest::Client,
}

impl IntrospectionStrategy {
    pub fn new(
        provider: ProviderId,
        userinfo_uri: Url,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "introspection timeout must be non-zero".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            provider,
            userinfo_uri,
            http,
        })
    }

    async fn introspect(&self, raw_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let response = self
            .http
            .get(self.userinfo_uri.clone())
            .bearer_auth(raw_token)
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AuthError::KeySetUnavailable(format!("malformed userinfo response: {e}"))
        })?;
        let subject = extract_subject(&body).ok_or_else(|| {
            AuthError::KeySetUnavailable("userinfo response carries no subject".to_string())
        })?;

        debug!(provider = %self.provider, "introspection accepted token");
        Ok(VerifiedIdentity::new(self.provider.clone(), subject))
    }
}

/// `sub` (standard userinfo) takes precedence; `id` (Kakao and friends)
/// may arrive as a string or a number.
fn extract_subject(body: &serde_json::Value) -> Option<String> {
    if let Some(sub) = body.get("sub").and_then(|v| v.as_str()) {
        return Some(sub.to_string());
    }
    match body.get("id") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl AuthenticationStrategy for IntrospectionStrategy {
    fn provider_id(&self) -> &ProviderId {
        &self.provider
    }

    #[instrument(skip(self, raw_token), fields(provider = %self.provider))]
    async fn authenticate(
        &self,
        raw_token: &str,
    ) -> Result<VerifiedIdentity, AuthenticationFailure> {
        self.introspect(raw_token).await.map_err(|kind| {
            warn!(provider = %self.provider, kind = %kind, "authentication failed");
            AuthenticationFailure::new(self.provider.clone(), kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_sub_over_id() {
        let body = json!({ "sub": "abc", "id": 42 });
        assert_eq!(extract_subject(&body).as_deref(), Some("abc"));
    }

    #[test]
    fn accepts_numeric_id() {
        let body = json!({ "id": 1234567890u64 });
        assert_eq!(extract_subject(&body).as_deref(), Some("1234567890"));
    }

    #[test]
    fn missing_subject_yields_none() {
        let body = json!({ "nickname": "someone" });
        assert!(extract_subject(&body).is_none());
    }
}
