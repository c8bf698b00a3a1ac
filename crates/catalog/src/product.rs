//! Product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::Money;

/// Stored product, keyed by its merchant-chosen code within the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub code: String,
    pub name: String,
    pub price: Money,
    /// Units currently available. Decremented atomically at purchase time.
    pub stock: u64,
    pub created_at: DateTime<Utc>,
}
