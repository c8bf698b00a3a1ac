//! Consistent error responses.
//!
//! Domain errors map to `{error, message}` JSON with a stable machine code.
//! Backend/internal failures are sanitized: their detail goes to the log,
//! never to the client.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mercado_catalog::CatalogError;
use mercado_identity::IdentityError;
use mercado_orders::PurchaseError;
use mercado_store::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    if err.is_retryable() {
        tracing::warn!(error = %err, "store unavailable after retry");
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "service temporarily unavailable",
        );
    }
    internal(err)
}

fn internal(err: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %err, "unexpected internal error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::MissingFields => {
            json_error(StatusCode::BAD_REQUEST, "missing_fields", err.to_string())
        }
        IdentityError::InvalidEmail => {
            json_error(StatusCode::BAD_REQUEST, "invalid_email", err.to_string())
        }
        IdentityError::WeakPassword => {
            json_error(StatusCode::BAD_REQUEST, "weak_password", err.to_string())
        }
        IdentityError::UserAlreadyExists => {
            json_error(StatusCode::CONFLICT, "user_already_exists", err.to_string())
        }
        IdentityError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        ),
        IdentityError::UserInactive => {
            json_error(StatusCode::UNAUTHORIZED, "user_inactive", err.to_string())
        }
        IdentityError::Store(e) => store_error_to_response(e),
        IdentityError::Password(e) => internal(e),
        IdentityError::Token(e) => internal(e),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::MissingFields => {
            json_error(StatusCode::BAD_REQUEST, "missing_fields", err.to_string())
        }
        CatalogError::ProductAlreadyExists(_) => {
            json_error(StatusCode::CONFLICT, "product_already_exists", err.to_string())
        }
        CatalogError::ProductNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "product_not_found", err.to_string())
        }
        CatalogError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        CatalogError::Contention(_) => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn purchase_error_to_response(err: PurchaseError) -> axum::response::Response {
    match err {
        PurchaseError::EmptyPurchase => {
            json_error(StatusCode::BAD_REQUEST, "empty_purchase", err.to_string())
        }
        PurchaseError::MissingFields => {
            json_error(StatusCode::BAD_REQUEST, "missing_fields", err.to_string())
        }
        PurchaseError::InvalidLineItem(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_line_item", err.to_string())
        }
        PurchaseError::ProductNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "product_not_found", err.to_string())
        }
        PurchaseError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        PurchaseError::PurchaseNotFound => {
            json_error(StatusCode::NOT_FOUND, "purchase_not_found", err.to_string())
        }
        PurchaseError::Forbidden => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden")
        }
        PurchaseError::Domain(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        PurchaseError::Store(e) => store_error_to_response(e),
        PurchaseError::Catalog(e) => catalog_error_to_response(e),
    }
}
