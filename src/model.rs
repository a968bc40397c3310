// src/model.rs

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};

use crate::config::ProviderId;
use crate::error::AuthError;

/// A single JSON Web Key as published at a provider's key-set endpoint
/// (RFC 7517). Only the members needed for verification are kept; unknown
/// fields are ignored on decode.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonWebKey {
    pub kid: String,
    pub kty: String,
    #[serde(rename = "use")]
    pub use_purpose: Option<String>,
    pub alg: Option<String>,
    // RSA members
    pub n: Option<String>,
    pub e: Option<String>,
    // EC members
    pub crv: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl JsonWebKey {
    /// Whether the key carries the material its `kty` requires. Key types
    /// other than RSA and EC are never usable here.
    pub(crate) fn is_usable(&self) -> bool {
        match self.kty.as_str() {
            "RSA" => self.n.is_some() && self.e.is_some(),
            "EC" => self.crv.is_some() && self.x.is_some() && self.y.is_some(),
            _ => false,
        }
    }

    /// Builds the verification key from the JWK members.
    pub(crate) fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        match self.kty.as_str() {
            "RSA" => {
                let n = self.require("n", self.n.as_deref())?;
                let e = self.require("e", self.e.as_deref())?;
                DecodingKey::from_rsa_components(n, e).map_err(|err| {
                    AuthError::KeySetUnavailable(format!(
                        "invalid RSA material on key `{}`: {err}",
                        self.kid
                    ))
                })
            }
            "EC" => {
                let x = self.require("x", self.x.as_deref())?;
                let y = self.require("y", self.y.as_deref())?;
                DecodingKey::from_ec_components(x, y).map_err(|err| {
                    AuthError::KeySetUnavailable(format!(
                        "invalid EC material on key `{}`: {err}",
                        self.kid
                    ))
                })
            }
            other => Err(AuthError::KeySetUnavailable(format!(
                "key `{}` has unsupported type `{other}`",
                self.kid
            ))),
        }
    }

    fn require<'a>(&self, member: &str, value: Option<&'a str>) -> Result<&'a str, AuthError> {
        value.ok_or_else(|| {
            AuthError::KeySetUnavailable(format!(
                "key `{}` is missing required member `{member}`",
                self.kid
            ))
        })
    }
}

/// A provider's current public signing keys, fetched as a unit.
/// Immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Exact-match lookup by key id.
    ///
    /// Pure selection: algorithm compatibility is the verifier's concern,
    /// not this lookup's.
    pub fn select(&self, kid: &str) -> Result<&JsonWebKey, AuthError> {
        self.keys
            .iter()
            .find(|key| key.kid == kid)
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_string(),
            })
    }
}

/// Claims decoded from a structurally valid, signature-verified token.
///
/// Still unvalidated at this point: issuer, audience and expiry are checked
/// by [`claims::validate`](crate::claims::validate). Provider-specific
/// extra claims are dropped on decode and never exposed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecodedClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    /// Expiry, epoch seconds.
    pub exp: u64,
    /// Issued-at, epoch seconds.
    pub iat: Option<u64>,
}

/// The result of a successful authentication: which provider vouched, and
/// for which subject.
///
/// Only constructible inside this crate by a full pipeline pass — there is
/// no way for calling code to fabricate one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedIdentity {
    provider: ProviderId,
    subject: String,
}

impl VerifiedIdentity {
    pub(crate) fn new(provider: ProviderId, subject: String) -> Self {
        Self { provider, subject }
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// The provider-scoped subject identifier. This is the only claim the
    /// pipeline exposes to callers.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
