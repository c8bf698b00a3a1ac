//! `mercado-orders` — the purchase workflow.

pub mod purchase;
pub mod workflow;

pub use purchase::{LineItem, PurchaseRecord, PurchaseStatus};
pub use workflow::{
    DEFAULT_LIST_LIMIT, ListPurchases, MAX_LIST_LIMIT, NewPurchase, PurchaseError, PurchaseLine,
    PurchasePage, PurchaseWorkflow,
};
