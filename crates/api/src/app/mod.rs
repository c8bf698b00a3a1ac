//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store and domain-service wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};
use tower::ServiceBuilder;

use mercado_auth::Hs256TokenCodec;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String) -> Router {
    let tokens = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        tokens: Arc::clone(&tokens),
    };

    let services = Arc::new(services::build_services(tokens));

    // Protected routes: require a bearer token + tenant context.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/registro", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
