use mercado_core::{TenantId, UserId};

/// Tenant context for a request.
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Principal context for a request (authenticated identity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    email: String,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, email: String) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
