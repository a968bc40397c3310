// src/claims.rs

use crate::config::ProviderConfig;
use crate::error::AuthError;
use crate::model::DecodedClaims;

/// Validates decoded claims against the provider's expectations.
///
/// Checks run in a fixed order — issuer, audience, expiry — and fail on the
/// first violation, which keeps failures reproducible. `now` is epoch
/// seconds injected by the caller, never read from a global clock here;
/// `exp <= now` counts as expired, with no grace window.
pub fn validate(claims: &DecodedClaims, config: &ProviderConfig, now: u64) -> Result<(), AuthError> {
    if claims.iss != config.issuer {
        return Err(AuthError::IssuerMismatch {
            found: claims.iss.clone(),
        });
    }
    if claims.aud != config.audience {
        return Err(AuthError::AudienceMismatch {
            found: claims.aud.clone(),
        });
    }
    if claims.exp <= now {
        return Err(AuthError::TokenExpired {
            expired_at: claims.exp,
        });
    }
    Ok(())
}
