//! Bearer-token claims model (transport-agnostic).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mercado_core::{TenantId, UserId};

/// Claims carried by an access token.
///
/// This is the minimal identity assertion the protected endpoints expect
/// once a token has been decoded/verified. Timestamps are unix seconds so
/// the encoded form is a standard JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Email the token was issued for.
    pub email: String,

    /// Tenant context for the token.
    pub tenant_id: TenantId,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiration (unix seconds).
    pub exp: i64,
}

impl AccessClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate claims against a clock.
///
/// Note: this validates the *claims* only. Signature verification/decoding
/// lives in [`crate::token`].
pub fn validate_claims(
    claims: &AccessClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
