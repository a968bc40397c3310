// src/lib.rs

//! Federated identity verification for social sign-in providers.
//!
//! Proves that a bearer-supplied identity token was genuinely issued by a
//! configured third-party provider, for a specific audience, and is still
//! valid — without the provider being reachable for a synchronous check.
//! The public-key pipeline fetches the provider's published signing keys,
//! selects by the token's key id, verifies the signature against an
//! algorithm allowlist, and validates issuer, audience and expiry. An
//! opaque-token introspection pipeline sits behind the same
//! [`AuthenticationStrategy`](strategy::AuthenticationStrategy) contract,
//! and the [`StrategyRegistry`](registry::StrategyRegistry) dispatches by
//! provider id.
//!
//! The only value a successful call exposes is a
//! [`VerifiedIdentity`](model::VerifiedIdentity); failures come back as an
//! [`AuthenticationFailure`](error::AuthenticationFailure) whose display
//! form is safe to show to untrusted callers.

pub mod cache;
pub mod claims;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod introspection;
pub mod model;
pub mod registry;
pub mod strategy;
pub mod verifier;

/// The public prelude for the `fedid` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::config::{ConfigError, ProviderConfig, ProviderConfigBuilder, ProviderId};
    pub use crate::error::{AuthError, AuthenticationFailure};
    pub use crate::introspection::IntrospectionStrategy;
    pub use crate::model::VerifiedIdentity;
    pub use crate::registry::StrategyRegistry;
    pub use crate::strategy::{AuthenticationStrategy, Clock, OidcStrategy, SystemClock};
    pub use jsonwebtoken::Algorithm;
}
