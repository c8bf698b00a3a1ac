use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use mercado_core::{PurchaseId, UserId};
use mercado_orders::{ListPurchases, NewPurchase, PurchaseLine};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub async fn create_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreatePurchaseRequest>,
) -> axum::response::Response {
    let request = NewPurchase {
        items: body
            .productos
            .into_iter()
            .map(|line| PurchaseLine {
                product_code: line.codigo,
                quantity: line.cantidad,
            })
            .collect(),
        delivery_address: body.direccion_entrega,
        payment_method: body.metodo_pago,
    };

    match services.orders.place(
        tenant.tenant_id(),
        principal.user_id(),
        &request,
        Utc::now(),
    ) {
        Ok(record) => {
            (StatusCode::CREATED, Json(dto::purchase_to_json(&record))).into_response()
        }
        Err(e) => errors::purchase_error_to_response(e),
    }
}

pub async fn get_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let purchase_id: PurchaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "purchase_not_found",
                "purchase not found",
            );
        }
    };

    match services
        .orders
        .get(tenant.tenant_id(), principal.user_id(), purchase_id)
    {
        Ok(record) => Json(dto::purchase_to_json(&record)).into_response(),
        Err(e) => errors::purchase_error_to_response(e),
    }
}

pub async fn list_purchases(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListPurchasesQuery>,
) -> axum::response::Response {
    // An explicit usuario_id must match the caller. A malformed one cannot
    // be the caller's, so it gets the same rejection.
    let requested_user_id = match query.usuario_id.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden");
            }
        },
    };

    let params = ListPurchases {
        user_id: principal.user_id(),
        requested_user_id,
        limit: query.limit,
        cursor: query.last_key,
    };

    match services.orders.list(tenant.tenant_id(), &params) {
        Ok(page) => {
            let compras: Vec<_> = page.purchases.iter().map(dto::purchase_to_json).collect();
            let count = compras.len();
            let mut body = serde_json::json!({
                "compras": compras,
                "count": count,
            });
            if let Some(cursor) = page.next_cursor {
                body["pagination"] = serde_json::json!({ "lastKey": cursor });
            }
            Json(body).into_response()
        }
        Err(e) => errors::purchase_error_to_response(e),
    }
}
