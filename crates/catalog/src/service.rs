//! Catalog operations, including the conditional stock debit the purchase
//! workflow depends on.

use chrono::{DateTime, Utc};
use thiserror::Error;

use mercado_core::{Money, TenantId};
use mercado_store::{StoreError, TenantKvStore, with_retry};

use crate::product::ProductRecord;

/// Store partition holding products, keyed by product code.
const PRODUCT_PARTITION: &str = "product";

/// Contention bound for the compare-and-swap stock debit. Exhausting it
/// surfaces as a conflict rather than spinning.
const MAX_CAS_ATTEMPTS: u32 = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("missing required product fields")]
    MissingFields,

    #[error("a product with code {0:?} already exists")]
    ProductAlreadyExists(String),

    #[error("product {0:?} not found")]
    ProductNotFound(String),

    /// The product exists but cannot cover the requested quantity. Carries
    /// what was actually available at decision time.
    #[error("insufficient stock for {code:?}: requested {requested}, available {available}")]
    InsufficientStock {
        code: String,
        requested: u64,
        available: u64,
    },

    /// CAS retry budget exhausted under contention.
    #[error("stock update contention for {0:?}")]
    Contention(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub stock: u64,
}

/// Product service over a tenant-scoped product store.
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: TenantKvStore<ProductRecord>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add a product. Codes are unique per tenant via conditional insert.
    pub fn create_product(
        &self,
        tenant_id: &TenantId,
        product: &NewProduct,
        now: DateTime<Utc>,
    ) -> Result<ProductRecord, CatalogError> {
        let code = product.code.trim();
        if code.is_empty() || product.name.trim().is_empty() {
            return Err(CatalogError::MissingFields);
        }

        let record = ProductRecord {
            code: code.to_string(),
            name: product.name.trim().to_string(),
            price: product.price,
            stock: product.stock,
            created_at: now,
        };

        match with_retry(|| self.store.insert(tenant_id, PRODUCT_PARTITION, code, record.clone()))
        {
            Ok(()) => {
                tracing::info!(tenant = %tenant_id, code, "product created");
                Ok(record)
            }
            Err(StoreError::AlreadyExists) => {
                Err(CatalogError::ProductAlreadyExists(code.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_product(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> Result<ProductRecord, CatalogError> {
        with_retry(|| self.store.get(tenant_id, PRODUCT_PARTITION, code))?
            .map(|v| v.value)
            .ok_or_else(|| CatalogError::ProductNotFound(code.to_string()))
    }

    /// Atomically decrement stock by `quantity`.
    ///
    /// Read-check-update under optimistic concurrency: on a version conflict
    /// the loop re-reads and re-checks, so of two concurrent debits competing
    /// for the last units exactly one succeeds and the other sees
    /// [`CatalogError::InsufficientStock`].
    pub fn debit_stock(
        &self,
        tenant_id: &TenantId,
        code: &str,
        quantity: u64,
    ) -> Result<ProductRecord, CatalogError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = with_retry(|| self.store.get(tenant_id, PRODUCT_PARTITION, code))?
                .ok_or_else(|| CatalogError::ProductNotFound(code.to_string()))?;

            let available = current.value.stock;
            if available < quantity {
                return Err(CatalogError::InsufficientStock {
                    code: code.to_string(),
                    requested: quantity,
                    available,
                });
            }

            let mut updated = current.value.clone();
            updated.stock = available - quantity;
            match self.store.update(
                tenant_id,
                PRODUCT_PARTITION,
                code,
                updated.clone(),
                current.version,
            ) {
                Ok(_) => return Ok(updated),
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) if e.is_retryable() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(CatalogError::Contention(code.to_string()))
    }

    /// Return previously debited units (compensation for a failed purchase).
    pub fn credit_stock(
        &self,
        tenant_id: &TenantId,
        code: &str,
        quantity: u64,
    ) -> Result<(), CatalogError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = with_retry(|| self.store.get(tenant_id, PRODUCT_PARTITION, code))?
                .ok_or_else(|| CatalogError::ProductNotFound(code.to_string()))?;

            let mut updated = current.value.clone();
            updated.stock = updated.stock.saturating_add(quantity);
            match self.store.update(
                tenant_id,
                PRODUCT_PARTITION,
                code,
                updated,
                current.version,
            ) {
                Ok(_) => return Ok(()),
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) if e.is_retryable() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(CatalogError::Contention(code.to_string()))
    }
}
