//! Audit Store - append-only scan log
//!
//! `PgScanStore` backs production; `MemoryScanStore` is used when no database
//! is configured and in tests. Both must accept concurrent `append` calls.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ScanRecord, ScanStatus};

pub use memory::MemoryScanStore;
pub use postgres::PgScanStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Persist one record. Callers log failures and keep going.
    async fn append(&self, record: &ScanRecord) -> StoreResult<()>;

    /// Newest first, at most `limit` records. `limit` is validated by the caller.
    async fn recent(&self, limit: u32) -> StoreResult<Vec<ScanRecord>>;

    async fn count_by_status(&self, status: ScanStatus) -> StoreResult<u64>;

    async fn count_all(&self) -> StoreResult<u64>;

    /// Connectivity check used at startup
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}
