//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ScanStore, StoreError, StoreResult};
use crate::models::{ScanRecord, ScanStatus};

pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScanRow {
    url: String,
    status: String,
    confidence: f64,
    analysis: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ScanRow> for ScanRecord {
    type Error = StoreError;

    fn try_from(row: ScanRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ScanStatus>().map_err(StoreError::Decode)?;

        Ok(ScanRecord {
            url: row.url,
            status,
            confidence: row.confidence,
            analysis: row.analysis,
            timestamp: row.created_at,
        })
    }
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn append(&self, record: &ScanRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO scans (id, url, status, confidence, analysis, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&record.url)
        .bind(record.status.as_str())
        .bind(record.confidence)
        .bind(&record.analysis)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> StoreResult<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT url, status, confidence, analysis, created_at
            FROM scans
            ORDER BY created_at DESC
            LIMIT $1
            "#
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScanRecord::try_from).collect()
    }

    async fn count_by_status(&self, status: ScanStatus) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(to_count(count))
    }

    async fn count_all(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans")
            .fetch_one(&self.pool)
            .await?;

        Ok(to_count(count))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
