//! Request/response DTOs and JSON mapping helpers.
//!
//! Wire field names are the public contract of the original service and
//! stay in Spanish (`nombre`, `codigo`, `cantidad`, ...); everything behind
//! the DTO layer uses the domain types.

use serde::Deserialize;
use serde_json::json;

use mercado_catalog::ProductRecord;
use mercado_core::{Money, TenantId};
use mercado_identity::UserSummary;
use mercado_orders::{PurchaseRecord, PurchaseStatus};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseLineRequest {
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub cantidad: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    #[serde(default)]
    pub productos: Vec<PurchaseLineRequest>,
    #[serde(default)]
    pub direccion_entrega: String,
    #[serde(default)]
    pub metodo_pago: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub precio: Option<Money>,
    #[serde(default)]
    pub stock: u64,
}

/// Query string for the purchase listing.
#[derive(Debug, Deserialize)]
pub struct ListPurchasesQuery {
    pub limit: Option<usize>,
    #[serde(rename = "lastKey")]
    pub last_key: Option<String>,
    pub usuario_id: Option<String>,
}

pub fn user_to_json(user: &UserSummary, tenant_id: &TenantId) -> serde_json::Value {
    json!({
        "userId": user.user_id.to_string(),
        "email": user.email,
        "nombre": user.display_name,
        "tenantId": tenant_id.to_string(),
    })
}

pub fn estado_to_str(status: PurchaseStatus) -> &'static str {
    match status {
        PurchaseStatus::Confirmed => "confirmada",
    }
}

pub fn purchase_to_json(purchase: &PurchaseRecord) -> serde_json::Value {
    json!({
        "compra_id": purchase.purchase_id.to_string(),
        "usuario_id": purchase.user_id.to_string(),
        "productos": purchase.items.iter().map(|item| json!({
            "codigo": item.product_code,
            "nombre": item.name,
            "cantidad": item.quantity,
            "precio_unitario": item.unit_price,
            "subtotal": item.subtotal,
        })).collect::<Vec<_>>(),
        "total": purchase.total,
        "estado": estado_to_str(purchase.status),
        "direccion_entrega": purchase.delivery_address,
        "metodo_pago": purchase.payment_method,
        "fecha_creacion": purchase.created_at.to_rfc3339(),
    })
}

pub fn product_to_json(product: &ProductRecord) -> serde_json::Value {
    json!({
        "codigo": product.code,
        "nombre": product.name,
        "precio": product.price,
        "stock": product.stock,
    })
}
