//! `mercado-store` — durable-store collaborator interface.
//!
//! Models the storage contract the services are written against: tenant-scoped
//! point lookups, conditional writes, and descending range queries with an
//! opaque continuation cursor. The in-memory implementation backs dev/tests;
//! a managed key-value backend slots in behind the same trait.

pub mod kv;
pub mod memory;
pub mod retry;

pub use kv::{Page, RangeQuery, StoreError, TenantKvStore, Versioned};
pub use memory::InMemoryKvStore;
pub use retry::with_retry;
