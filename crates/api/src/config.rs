//! Environment-based configuration for the API binary.

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HS256 signing secret shared by every deployment of this service.
    pub jwt_secret: String,
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self { jwt_secret, bind_addr }
    }
}
