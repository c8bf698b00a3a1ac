//! `mercado-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::DomainError;
pub use id::{PurchaseId, TenantId, UserId};
pub use money::Money;
