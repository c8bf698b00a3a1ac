//! Registration and login.

use chrono::{DateTime, Utc};
use thiserror::Error;

use mercado_auth::{Hs256TokenCodec, Identity, IssuedToken, PasswordError, TokenError};
use mercado_core::{TenantId, UserId};
use mercado_store::{StoreError, TenantKvStore, with_retry};

use crate::user::{UserRecord, UserSummary, normalize_email};

/// Store partition holding user accounts, keyed by normalized email.
const USER_PARTITION: &str = "user";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("missing required fields")]
    MissingFields,

    #[error("email address is malformed")]
    InvalidEmail,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("a user with this email already exists")]
    UserAlreadyExists,

    /// Deliberately covers both unknown email and wrong password, so the
    /// response does not reveal which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user account is inactive")]
    UserInactive,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Successful login: a bearer token plus the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: UserSummary,
}

/// Account service over a tenant-scoped user store.
pub struct IdentityService<S> {
    store: S,
    tokens: std::sync::Arc<Hs256TokenCodec>,
}

impl<S> IdentityService<S>
where
    S: TenantKvStore<UserRecord>,
{
    pub fn new(store: S, tokens: std::sync::Arc<Hs256TokenCodec>) -> Self {
        Self { store, tokens }
    }

    /// Create a new account.
    ///
    /// Email uniqueness (per tenant) rides on the store's conditional
    /// insert, so two concurrent registrations for the same email cannot
    /// both succeed.
    pub fn register(
        &self,
        tenant_id: &TenantId,
        request: &RegisterRequest,
        now: DateTime<Utc>,
    ) -> Result<UserSummary, IdentityError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() || request.display_name.trim().is_empty()
        {
            return Err(IdentityError::MissingFields);
        }
        if !email.contains('@') {
            return Err(IdentityError::InvalidEmail);
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }

        let record = UserRecord {
            tenant_id: tenant_id.clone(),
            user_id: UserId::new(),
            email: email.clone(),
            password_hash: mercado_auth::hash_password(&request.password)?,
            display_name: request.display_name.trim().to_string(),
            active: true,
            created_at: now,
        };

        let summary = UserSummary::from(&record);
        match with_retry(|| self.store.insert(tenant_id, USER_PARTITION, &email, record.clone())) {
            Ok(()) => {
                tracing::info!(tenant = %tenant_id, user = %summary.user_id, "user registered");
                Ok(summary)
            }
            Err(StoreError::AlreadyExists) => Err(IdentityError::UserAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate and issue an access token.
    pub fn login(
        &self,
        tenant_id: &TenantId,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, IdentityError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(IdentityError::MissingFields);
        }

        let record = with_retry(|| self.store.get(tenant_id, USER_PARTITION, &email))?
            .ok_or(IdentityError::InvalidCredentials)?
            .value;

        if !mercado_auth::verify_password(password, &record.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }
        if !record.active {
            return Err(IdentityError::UserInactive);
        }

        let identity = Identity {
            user_id: record.user_id,
            tenant_id: tenant_id.clone(),
            email: record.email.clone(),
        };
        let token = self.tokens.issue(&identity, now)?;
        tracing::info!(tenant = %tenant_id, user = %record.user_id, "login succeeded");

        Ok(LoginOutcome {
            token,
            user: UserSummary::from(&record),
        })
    }

    /// Look up an account by email (e.g. to resolve the current principal).
    pub fn find_by_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<UserRecord>, IdentityError> {
        let email = normalize_email(email);
        Ok(with_retry(|| self.store.get(tenant_id, USER_PARTITION, &email))?.map(|v| v.value))
    }
}
