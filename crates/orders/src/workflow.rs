//! Placing, fetching and listing purchases.
//!
//! A purchase debits stock for every line before the record is written.
//! If any debit fails, previously debited lines are credited back, so a
//! rejected purchase never leaves stock or history mutated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use mercado_catalog::{CatalogError, CatalogService};
use mercado_core::{DomainError, Money, PurchaseId, TenantId, UserId};
use mercado_store::{RangeQuery, StoreError, TenantKvStore, with_retry};

use crate::purchase::{LineItem, PurchaseRecord, PurchaseStatus};

pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const MAX_LIST_LIMIT: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("a purchase needs at least one line item")]
    EmptyPurchase,

    #[error("missing required fields")]
    MissingFields,

    #[error("invalid line item: {0}")]
    InvalidLineItem(String),

    #[error("product {0:?} not found")]
    ProductNotFound(String),

    #[error("insufficient stock for {code:?}: requested {requested}, available {available}")]
    InsufficientStock {
        code: String,
        requested: u64,
        available: u64,
    },

    #[error("purchase not found")]
    PurchaseNotFound,

    /// The caller asked for another user's purchases.
    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Catalog failures that are not stock/lookup outcomes (contention,
    /// backend unavailability).
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for PurchaseError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProductNotFound(code) => PurchaseError::ProductNotFound(code),
            CatalogError::InsufficientStock {
                code,
                requested,
                available,
            } => PurchaseError::InsufficientStock {
                code,
                requested,
                available,
            },
            other => PurchaseError::Catalog(other),
        }
    }
}

/// One requested line of a new purchase.
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub product_code: String,
    pub quantity: u64,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub items: Vec<PurchaseLine>,
    pub delivery_address: String,
    pub payment_method: String,
}

/// Listing parameters. `user_id` is the principal placing the request;
/// `requested_user_id`, when present, must match it.
#[derive(Debug, Clone)]
pub struct ListPurchases {
    pub user_id: UserId,
    pub requested_user_id: Option<UserId>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PurchasePage {
    pub purchases: Vec<PurchaseRecord>,
    pub next_cursor: Option<String>,
}

/// Purchase workflow over a purchase store and the catalog.
pub struct PurchaseWorkflow<PS, CS> {
    purchases: PS,
    catalog: Arc<CatalogService<CS>>,
}

fn purchase_partition(user_id: &UserId) -> String {
    format!("purchase#{user_id}")
}

impl<PS, CS> PurchaseWorkflow<PS, CS>
where
    PS: TenantKvStore<PurchaseRecord>,
    CS: TenantKvStore<mercado_catalog::ProductRecord>,
{
    pub fn new(purchases: PS, catalog: Arc<CatalogService<CS>>) -> Self {
        Self { purchases, catalog }
    }

    /// Place a purchase for `user_id`.
    ///
    /// Lines are debited in request order. Duplicate product codes are kept
    /// as separate lines and debited separately.
    pub fn place(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        request: &NewPurchase,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord, PurchaseError> {
        if request.items.is_empty() {
            return Err(PurchaseError::EmptyPurchase);
        }
        if request.delivery_address.trim().is_empty() || request.payment_method.trim().is_empty()
        {
            return Err(PurchaseError::MissingFields);
        }
        for line in &request.items {
            if line.product_code.trim().is_empty() {
                return Err(PurchaseError::InvalidLineItem(
                    "product code must not be empty".to_string(),
                ));
            }
            if line.quantity == 0 {
                return Err(PurchaseError::InvalidLineItem(format!(
                    "quantity for {:?} must be at least 1",
                    line.product_code
                )));
            }
        }

        // Price every line before touching stock, so validation failures
        // (unknown product, overflow) cost nothing to undo.
        let mut items = Vec::with_capacity(request.items.len());
        let mut total = Money::ZERO;
        for line in &request.items {
            let product = self.catalog.get_product(tenant_id, &line.product_code)?;
            let subtotal = product.price.checked_mul(line.quantity)?;
            total = total.checked_add(subtotal)?;
            items.push(LineItem {
                product_code: product.code,
                name: product.name,
                quantity: line.quantity,
                unit_price: product.price,
                subtotal,
            });
        }

        // Debit every line; on failure credit back what was already taken.
        let mut debited: Vec<(&str, u64)> = Vec::with_capacity(items.len());
        for item in &items {
            if let Err(e) = self
                .catalog
                .debit_stock(tenant_id, &item.product_code, item.quantity)
            {
                self.compensate(tenant_id, &debited);
                return Err(e.into());
            }
            debited.push((&item.product_code, item.quantity));
        }

        let record = PurchaseRecord {
            purchase_id: PurchaseId::new(),
            user_id,
            items,
            total,
            status: PurchaseStatus::Confirmed,
            delivery_address: request.delivery_address.trim().to_string(),
            payment_method: request.payment_method.trim().to_string(),
            created_at: now,
        };

        let partition = purchase_partition(&user_id);
        let sort = record.purchase_id.to_string();
        if let Err(e) =
            with_retry(|| self.purchases.insert(tenant_id, &partition, &sort, record.clone()))
        {
            let debited: Vec<(&str, u64)> = record
                .items
                .iter()
                .map(|i| (i.product_code.as_str(), i.quantity))
                .collect();
            self.compensate(tenant_id, &debited);
            return Err(e.into());
        }

        tracing::info!(
            tenant = %tenant_id,
            user = %user_id,
            purchase = %record.purchase_id,
            total = %record.total,
            "purchase confirmed"
        );
        Ok(record)
    }

    fn compensate(&self, tenant_id: &TenantId, debited: &[(&str, u64)]) {
        for (code, quantity) in debited {
            if let Err(e) = self.catalog.credit_stock(tenant_id, code, *quantity) {
                // Nothing left to do inline; flag it for reconciliation.
                tracing::error!(
                    tenant = %tenant_id,
                    code,
                    quantity,
                    error = %e,
                    "stock compensation failed"
                );
            }
        }
    }

    /// Fetch one of the caller's purchases.
    pub fn get(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        purchase_id: PurchaseId,
    ) -> Result<PurchaseRecord, PurchaseError> {
        let partition = purchase_partition(&user_id);
        let sort = purchase_id.to_string();
        with_retry(|| self.purchases.get(tenant_id, &partition, &sort))?
            .map(|v| v.value)
            .ok_or(PurchaseError::PurchaseNotFound)
    }

    /// List the caller's purchases, newest first.
    ///
    /// `limit` is clamped to `1..=MAX_LIST_LIMIT` without error; the cursor
    /// is opaque and passed back verbatim from a previous page.
    pub fn list(
        &self,
        tenant_id: &TenantId,
        params: &ListPurchases,
    ) -> Result<PurchasePage, PurchaseError> {
        if let Some(requested) = params.requested_user_id {
            if requested != params.user_id {
                return Err(PurchaseError::Forbidden);
            }
        }

        let limit = params
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let partition = purchase_partition(&params.user_id);
        let query = RangeQuery {
            limit,
            descending: true,
            start_after: params.cursor.clone(),
        };

        let page = with_retry(|| self.purchases.query(tenant_id, &partition, &query))?;
        Ok(PurchasePage {
            purchases: page.items.into_iter().map(|v| v.value).collect(),
            next_cursor: page.next_cursor,
        })
    }
}
