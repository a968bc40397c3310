// src/error.rs

use std::fmt;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::config::ProviderId;

/// The reason an authentication attempt failed.
///
/// Every variant is terminal for the current call; nothing here is retried
/// internally. A failed authentication is an expected outcome, never a
/// process-level fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// The provider's verification endpoint could not be reached, timed
    /// out, or answered with a malformed body. Covers the key-set endpoint
    /// in the public-key pipeline and the userinfo endpoint in the
    /// introspection pipeline.
    #[error("verification endpoint unavailable: {0}")]
    KeySetUnavailable(String),

    /// No key in the fetched key set matches the token's key id.
    #[error("no key in the provider's key set matches kid `{kid}`")]
    KeyNotFound { kid: String },

    /// The token could not be parsed into header, payload and signature,
    /// or its payload lacks the claims a signed identity token must carry.
    #[error("token is not a structurally valid signed identity token")]
    MalformedToken,

    /// The header's declared algorithm is not in the configured allowlist.
    #[error("token algorithm {alg:?} is not in the configured allowlist")]
    UnsupportedAlgorithm { alg: Algorithm },

    /// Cryptographic verification of the signature against the selected
    /// key did not succeed.
    #[error("token signature does not verify against the selected key")]
    SignatureInvalid,

    #[error("issuer mismatch: token was issued by `{found}`")]
    IssuerMismatch { found: String },

    #[error("audience mismatch: token is addressed to `{found}`")]
    AudienceMismatch { found: String },

    /// `exp <= now`; the boundary is inclusive and there is no grace window.
    #[error("token expired at {expired_at} (epoch seconds)")]
    TokenExpired { expired_at: u64 },

    #[error("no authentication strategy is registered for provider `{provider}`")]
    UnsupportedProvider { provider: ProviderId },

    /// The introspection endpoint answered but refused the presented token.
    #[error("provider rejected the token (HTTP {status})")]
    TokenRejected { status: u16 },
}

/// An authentication failure tagged with the provider it occurred against.
///
/// The `Display` form is deliberately opaque: it never reveals which check
/// failed, so it can be shown to untrusted callers verbatim without aiding
/// forgery attempts. The precise [`AuthError`] stays available through
/// [`kind`](Self::kind) and the error source chain for logging and
/// telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationFailure {
    provider: ProviderId,
    kind: AuthError,
}

impl AuthenticationFailure {
    pub fn new(provider: ProviderId, kind: AuthError) -> Self {
        Self { provider, kind }
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    pub fn kind(&self) -> &AuthError {
        &self.kind
    }

    pub fn into_kind(self) -> AuthError {
        self.kind
    }
}

impl fmt::Display for AuthenticationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "authentication failed for provider `{}`", self.provider)
    }
}

impl std::error::Error for AuthenticationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_does_not_leak_the_failure_kind() {
        let failure = AuthenticationFailure::new(
            ProviderId::new("apple"),
            AuthError::IssuerMismatch {
                found: "https://evil.example".to_string(),
            },
        );
        let message = failure.to_string();
        assert_eq!(message, "authentication failed for provider `apple`");
        assert!(!message.contains("issuer"));
        assert!(!message.contains("evil"));
    }

    #[test]
    fn kind_stays_reachable_for_telemetry() {
        let failure = AuthenticationFailure::new(
            ProviderId::new("apple"),
            AuthError::SignatureInvalid,
        );
        assert_eq!(failure.kind(), &AuthError::SignatureInvalid);
        assert!(std::error::Error::source(&failure).is_some());
    }
}
