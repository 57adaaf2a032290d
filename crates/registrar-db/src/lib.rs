//! # Registrar DB
//!
//! PostgreSQL pool initialization and the schema migrations shipped in the
//! repository's top-level `migrations/` directory.
//!
//! ```ignore
//! let pool = registrar_db::init_db_pool().await?;
//! registrar_db::run_migrations(&pool).await?;
//! ```

use std::env;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::migrate::Migrator;

pub use sqlx::PgPool;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Migrations compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

fn max_connections_from_env() -> u32 {
    env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|n: &u32| *n > 0)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Connects to `DATABASE_URL` with `DATABASE_MAX_CONNECTIONS` pooled
/// connections.
pub async fn init_db_pool() -> anyhow::Result<PgPool> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = max_connections_from_env();

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Database pool initialized");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
