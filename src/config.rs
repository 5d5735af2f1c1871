//! Process configuration, read once at startup and injected into components.

use crate::error::AppError;

const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub max_connections: u32,
}

impl AppConfig {
    /// Read configuration from the environment (after `dotenvy` has loaded
    /// any `.env` file). `DATABASE_URL` and `JWT_SECRET` are mandatory; a
    /// default signing secret would silently break verification across
    /// deployments.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = require("DATABASE_URL")?;
        let jwt_secret = require("JWT_SECRET")?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        let max_connections = std::env::var("PG_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Ok(AppConfig {
            database_url,
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            max_connections,
        })
    }
}

fn require(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Config(format!("{} is not set", name)))
}
