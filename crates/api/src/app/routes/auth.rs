use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use mercado_core::TenantId;
use mercado_identity::RegisterRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let tenant_id = match TenantId::new(body.tenant_id) {
        Ok(t) => t,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "missing_fields",
                "tenant_id is required",
            );
        }
    };

    let request = RegisterRequest {
        email: body.email,
        password: body.password,
        display_name: body.nombre,
    };

    match services.identity.register(&tenant_id, &request, Utc::now()) {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "usuario_id": user.user_id.to_string(),
                "email": user.email,
                "nombre": user.display_name,
            })),
        )
            .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let tenant_id = match TenantId::new(body.tenant_id) {
        Ok(t) => t,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "missing_fields",
                "tenant_id is required",
            );
        }
    };

    match services
        .identity
        .login(&tenant_id, &body.email, &body.password, Utc::now())
    {
        Ok(outcome) => Json(serde_json::json!({
            "token": outcome.token.token,
            "expires_in": outcome.token.expires_in,
            "user": dto::user_to_json(&outcome.user, &tenant_id),
        }))
        .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

/// Verified identity context of the caller (the old token-validation
/// function, exposed as a protected read).
pub async fn me(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": principal.user_id().to_string(),
        "email": principal.email(),
        "tenantId": tenant.tenant_id().to_string(),
    }))
}
