use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod jwt;
mod models;
mod password;
mod repositories;
mod routes;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{
    config::AuthConfig,
    jwt::{JwtConfig, JwtService},
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    let config = AuthConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env(
        config.jwt_access_token_expiry,
        config.jwt_refresh_token_expiry,
    )?;
    let jwt_service = JwtService::new(jwt_config)?;

    let app_state = AppState {
        jwt_service,
        user_repository: UserRepository::new(pool),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
