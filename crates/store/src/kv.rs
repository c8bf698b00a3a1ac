//! Tenant-scoped key/value store abstraction.
//!
//! Records live under `(tenant, partition, sort)` keys. Partitions group
//! records of one kind (`"user"`, `"product"`, `"purchase#<user_id>"`);
//! the sort key orders records within a partition and doubles as the
//! continuation cursor for range queries.

use std::sync::Arc;

use thiserror::Error;

use mercado_core::TenantId;

/// Store operation error.
///
/// These are **infrastructure errors** (conditional-write failures,
/// availability) as opposed to domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Conditional insert failed: a record already exists under the key.
    #[error("record already exists")]
    AlreadyExists,

    /// Conditional update failed: the record changed since it was read.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    /// Update target does not exist.
    #[error("record not found")]
    NotFound,

    /// The backend timed out or is unreachable. Retryable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the caller may retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// A stored value together with its optimistic-concurrency version.
///
/// Versions start at 1 on insert and increase by 1 per successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<V> {
    pub value: V,
    pub version: u64,
}

/// Range query over one partition.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    /// Maximum number of records to return.
    pub limit: usize,
    /// Newest-first when the sort key is time-ordered.
    pub descending: bool,
    /// Opaque continuation cursor from a previous page, passed back verbatim.
    pub start_after: Option<String>,
}

/// One page of a range query.
#[derive(Debug, Clone)]
pub struct Page<V> {
    pub items: Vec<Versioned<V>>,
    /// Present when more records follow; feed back as `start_after`.
    pub next_cursor: Option<String>,
}

/// Tenant-isolated key/value store with conditional writes.
///
/// Implementations must:
/// - enforce tenant isolation (no key is reachable from another tenant)
/// - make `insert` fail with [`StoreError::AlreadyExists`] instead of
///   overwriting (this is the uniqueness primitive registration relies on)
/// - make `update` atomic with respect to the version check (this is the
///   conditional-decrement primitive the stock debit relies on)
pub trait TenantKvStore<V>: Send + Sync {
    /// Point lookup.
    fn get(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Versioned<V>>, StoreError>;

    /// Create-if-absent. The new record has version 1.
    fn insert(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
    ) -> Result<(), StoreError>;

    /// Replace the record only while its current version equals
    /// `expected_version`. Returns the new version.
    fn update(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Range query over a partition, ordered by sort key.
    fn query(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        query: &RangeQuery,
    ) -> Result<Page<V>, StoreError>;
}

impl<V, S> TenantKvStore<V> for Arc<S>
where
    S: TenantKvStore<V> + ?Sized,
{
    fn get(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Versioned<V>>, StoreError> {
        (**self).get(tenant_id, partition, sort)
    }

    fn insert(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
    ) -> Result<(), StoreError> {
        (**self).insert(tenant_id, partition, sort, value)
    }

    fn update(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        sort: &str,
        value: V,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        (**self).update(tenant_id, partition, sort, value, expected_version)
    }

    fn query(
        &self,
        tenant_id: &TenantId,
        partition: &str,
        query: &RangeQuery,
    ) -> Result<Page<V>, StoreError> {
        (**self).query(tenant_id, partition, query)
    }
}
