//! Store and domain-service wiring.
//!
//! Every service runs over the in-memory store implementation. Swapping in
//! a durable backend means providing another `TenantKvStore` and changing
//! only this file.

use std::sync::Arc;

use mercado_auth::Hs256TokenCodec;
use mercado_catalog::{CatalogService, ProductRecord};
use mercado_identity::{IdentityService, UserRecord};
use mercado_orders::{PurchaseRecord, PurchaseWorkflow};
use mercado_store::InMemoryKvStore;

pub type UserStore = Arc<InMemoryKvStore<UserRecord>>;
pub type ProductStore = Arc<InMemoryKvStore<ProductRecord>>;
pub type PurchaseStore = Arc<InMemoryKvStore<PurchaseRecord>>;

pub struct AppServices {
    pub identity: IdentityService<UserStore>,
    pub catalog: Arc<CatalogService<ProductStore>>,
    pub orders: PurchaseWorkflow<PurchaseStore, ProductStore>,
}

pub fn build_services(tokens: Arc<Hs256TokenCodec>) -> AppServices {
    let users: UserStore = Arc::new(InMemoryKvStore::new());
    let products: ProductStore = Arc::new(InMemoryKvStore::new());
    let purchases: PurchaseStore = Arc::new(InMemoryKvStore::new());

    let catalog = Arc::new(CatalogService::new(Arc::clone(&products)));

    AppServices {
        identity: IdentityService::new(users, tokens),
        catalog: Arc::clone(&catalog),
        orders: PurchaseWorkflow::new(purchases, catalog),
    }
}
