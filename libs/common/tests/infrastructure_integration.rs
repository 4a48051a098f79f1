//! Integration tests for the database bootstrap
//!
//! These need a reachable PostgreSQL instance in `DATABASE_URL`, so they are
//! ignored by default: `cargo test -p common -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance in DATABASE_URL"]
async fn test_schema_applies_and_collections_exist() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Applying twice is a no-op
    run_migrations(&pool).await?;

    for table in ["users", "songs", "playlists"] {
        let row = sqlx::query("SELECT to_regclass($1)::text AS name")
            .bind(table)
            .fetch_one(&pool)
            .await?;
        let name: Option<String> = row.get("name");
        assert_eq!(name.as_deref(), Some(table), "missing table {table}");
    }

    Ok(())
}
