// src/verifier.rs

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use crate::error::AuthError;
use crate::model::{DecodedClaims, JsonWebKey};

/// Decodes the token's header without verifying anything, returning the
/// declared algorithm and key id.
pub(crate) fn decode_unverified_header(
    token: &str,
) -> Result<(Algorithm, Option<String>), AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
    Ok((header.alg, header.kid))
}

/// Verifies the token's structure and signature, returning the decoded,
/// still-unvalidated claims.
///
/// The header's declared algorithm must be in `allowed` regardless of what
/// the selected key implies; that closes the algorithm-confusion downgrade.
/// Claim validation is disabled at this layer on purpose so
/// [`claims::validate`](crate::claims::validate) can own it with
/// deterministic ordering, and back differently-sourced claims later.
pub fn verify(
    token: &str,
    key: &JsonWebKey,
    allowed: &[Algorithm],
) -> Result<DecodedClaims, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
    if !allowed.contains(&header.alg) {
        return Err(AuthError::UnsupportedAlgorithm { alg: header.alg });
    }

    let decoding_key = key.decoding_key()?;

    // Signature only: issuer, audience and expiry are validated downstream
    // against the provider config and an injected clock.
    let mut validation = Validation::new(header.alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    let data = decode::<DecodedClaims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::Crypto(_) => AuthError::SignatureInvalid,
            // Allowlisted algorithm, but the selected key's family cannot
            // have produced a valid signature under it.
            ErrorKind::InvalidAlgorithm => AuthError::SignatureInvalid,
            _ => AuthError::MalformedToken,
        }
    })?;

    Ok(data.claims)
}
