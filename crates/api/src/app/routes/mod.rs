use axum::{Router, routing::get, routing::post};

pub mod auth;
pub mod products;
pub mod purchases;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/compras", post(purchases::create_purchase).get(purchases::list_purchases))
        .route("/compras/:id", get(purchases::get_purchase))
        .route("/productos", post(products::create_product))
        .route("/productos/:codigo", get(products::get_product))
}
