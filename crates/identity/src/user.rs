//! User account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{TenantId, UserId};

/// Stored user account.
///
/// Keyed by normalized email within the tenant, so email uniqueness is
/// enforced by the store's conditional insert rather than a read-then-write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub email: String,
    /// Argon2id PHC string. Never exposed outside this crate.
    pub password_hash: String,
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user account (no credential material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email.clone(),
            display_name: record.display_name.clone(),
        }
    }
}

/// Canonical form of an email for lookup keys: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }
}
