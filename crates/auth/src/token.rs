//! Self-contained signed access tokens (HS256).
//!
//! Tokens embed the verified identity and a fixed expiry, signed with a
//! process-wide shared secret supplied at startup. No server-side token
//! store exists; independently deployed functions verify tokens locally.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use mercado_core::{TenantId, UserId};

use crate::claims::{AccessClaims, TokenValidationError, validate_claims};

/// Fixed token lifetime from issuance (not sliding).
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Verified identity context asserted by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
}

/// A freshly issued token plus its expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token encoding failed")]
    Encoding,
}

/// Issues and verifies HS256-signed access tokens over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        // Expiry is enforced by `validate_claims` so the expired case stays
        // distinguishable from a bad signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for a verified identity, valid for [`TOKEN_TTL_SECS`].
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let exp = iat + TOKEN_TTL_SECS;
        let claims = AccessClaims {
            sub: identity.user_id,
            email: identity.email.clone(),
            tenant_id: identity.tenant_id.clone(),
            iat,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Encoding)?;

        Ok(IssuedToken {
            token,
            expires_in: TOKEN_TTL_SECS,
            expires_at: DateTime::from_timestamp(exp, 0).unwrap_or(now),
        })
    }

    /// Verify signature and claims, returning the asserted identity.
    ///
    /// Idempotent and side-effect free: safe to call repeatedly with the
    /// same token.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            tenant_id: data.claims.tenant_id,
            email: data.claims.email,
        })
    }
}
