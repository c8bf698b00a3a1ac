use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use mercado_catalog::NewProduct;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let Some(precio) = body.precio else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_fields",
            "precio is required",
        );
    };

    let product = NewProduct {
        code: body.codigo,
        name: body.nombre,
        price: precio,
        stock: body.stock,
    };

    match services
        .catalog
        .create_product(tenant.tenant_id(), &product, Utc::now())
    {
        Ok(record) => {
            (StatusCode::CREATED, Json(dto::product_to_json(&record))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(codigo): Path<String>,
) -> axum::response::Response {
    match services.catalog.get_product(tenant.tenant_id(), &codigo) {
        Ok(record) => Json(dto::product_to_json(&record)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
