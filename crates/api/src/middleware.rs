use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use mercado_auth::{Hs256TokenCodec, TokenError};

use crate::app::errors::json_error;
use crate::context::{PrincipalContext, TenantContext};

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<Hs256TokenCodec>,
}

/// Bearer-token guard for protected routes.
///
/// Verification is side-effect free; on success the tenant and principal
/// contexts are injected as request extensions. CORS preflight requests
/// (OPTIONS) succeed before any credential check.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    if req.method() == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let token = extract_bearer(req.headers())?;

    let identity = state.tokens.verify(token, Utc::now()).map_err(|e| match e {
        TokenError::Expired => {
            json_error(StatusCode::UNAUTHORIZED, "token_expired", "token has expired")
        }
        _ => json_error(StatusCode::UNAUTHORIZED, "token_invalid", "invalid token"),
    })?;

    req.extensions_mut()
        .insert(TenantContext::new(identity.tenant_id));
    req.extensions_mut()
        .insert(PrincipalContext::new(identity.user_id, identity.email));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let missing =
        || json_error(StatusCode::UNAUTHORIZED, "missing_credential", "missing bearer token");

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}
