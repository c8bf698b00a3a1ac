//! Purchase records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{Money, PurchaseId, UserId};

/// One line of a purchase, priced at purchase time.
///
/// Name and unit price are copied from the product so the record stays
/// meaningful if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_code: String,
    pub name: String,
    pub quantity: u64,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Confirmed,
}

/// Stored purchase, keyed by `(purchase#<user_id>, purchase_id)`.
///
/// The purchase id is time-ordered, so the sort key gives newest-first
/// listing directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub purchase_id: PurchaseId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub status: PurchaseStatus,
    pub delivery_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}
