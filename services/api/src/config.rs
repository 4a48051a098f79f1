//! Server configuration loaded from the environment

use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// HTTP server configuration
///
/// # Environment Variables
/// - `HOST`: interface to bind (default: 0.0.0.0)
/// - `PORT`: port to bind (default: 5000)
/// - `APP_ENV`: `production` enables static asset serving (default: development)
/// - `STATIC_DIR`: built frontend bundle (default: ../frontend/build)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub app_env: String,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("app_env", "development")?
            .set_default("static_dir", "../frontend/build")?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
