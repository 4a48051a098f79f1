//! Identity service configuration loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Server and token lifetime settings
///
/// # Environment Variables
/// - `HOST`: interface to bind (default: 0.0.0.0)
/// - `PORT`: port to bind (default: 5001)
/// - `JWT_ACCESS_TOKEN_EXPIRY`: access token lifetime in seconds (default: 900)
/// - `JWT_REFRESH_TOKEN_EXPIRY`: refresh token lifetime in seconds (default: 604800)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub host: String,
    pub port: u16,
    pub jwt_access_token_expiry: u64,
    pub jwt_refresh_token_expiry: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5001)?
            .set_default("jwt_access_token_expiry", 900)?
            .set_default("jwt_refresh_token_expiry", 604_800)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
