use std::time::Duration;

use anyhow::{anyhow, Context};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, Executor, PgPool};
use tracing::info;

use crate::config::Config;

/// Table definition for the `pastes` table, safe to apply repeatedly.
const SCHEMA: &str = include_str!("../assets/schema.sql");

/// Open the connection pool and make sure the store answers.
pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .acquire_timeout(config.acquire_timeout())
        .test_before_acquire(true)
        .connect_lazy_with(config.connect_options());

    let timeout = config.connect_timeout();
    tokio::time::timeout(timeout, ping(&pool))
        .await
        .map_err(|_| anyhow!("no response within {timeout:?}"))?
        .context("unable to ping database")?;

    info!(
        "database connection established: {}:{}/{}",
        config.db_host, config.db_port, config.db_name
    );

    Ok(pool)
}

async fn ping(pool: &PgPool) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}

pub async fn close(pool: &PgPool) {
    pool.close().await;
    info!("database connection closed");
}

/// Create the `pastes` table and its index if they are missing.
pub async fn apply_schema(pool: &PgPool) -> anyhow::Result<()> {
    pool.execute(SCHEMA)
        .await
        .context("failed to apply schema")?;
    Ok(())
}
