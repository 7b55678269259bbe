//! Database module - PostgreSQL connection and schema

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool.
///
/// Connections are opened lazily so the service starts even when the
/// database is down; scans still return, only their persistence fails.
pub fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)
}

/// Create the scans table if it does not exist
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // One statement per call; prepared statements reject multi-statement strings
    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS scans (
    id UUID PRIMARY KEY,
    url TEXT NOT NULL,
    status VARCHAR(16) NOT NULL,
    confidence DOUBLE PRECISION NOT NULL,
    analysis TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_scans_created ON scans(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_scans_status ON scans(status);
"#;
