//! `mercado-auth` — authentication boundary (passwords + bearer tokens).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{AccessClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256TokenCodec, Identity, IssuedToken, TOKEN_TTL_SECS, TokenError};
