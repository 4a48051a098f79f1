use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use playlist_api::{AppState, config::ServerConfig, middleware::JwtVerifier, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting playlist API");

    let server_config = ServerConfig::from_env()?;
    let jwt = JwtVerifier::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let mut app = routes::create_router(AppState::postgres(pool, jwt));
    if server_config.is_production() {
        info!("Serving static assets from {}", server_config.static_dir.display());
        app = routes::with_static_assets(app, &server_config.static_dir);
    }

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Playlist API listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
