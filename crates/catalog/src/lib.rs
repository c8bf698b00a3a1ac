//! `mercado-catalog` — product catalog and stock levels.

pub mod product;
pub mod service;

pub use product::ProductRecord;
pub use service::{CatalogError, CatalogService, NewProduct};
