//! Database wiring: connection pool + schema bootstrap.

pub use sqlx::PgPool;

use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

/// Catalog and ledger tables (`CREATE ... IF NOT EXISTS`, safe to re-run).
pub const SCHEMA: &str = include_str!("../migrations/0001_stock_ledger.sql");

/// Open a Postgres connection pool.
#[instrument(skip(database_url), err)]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create missing tables, constraints and indexes.
#[instrument(skip(pool), err)]
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("database schema is up to date");
    Ok(())
}
