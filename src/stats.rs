//! Stats Aggregator
//!
//! Three independent reads; counts may skew slightly under concurrent writes.

use crate::models::{ScanStatus, StatsSnapshot};
use crate::store::{ScanStore, StoreResult};

pub async fn snapshot(store: &dyn ScanStore) -> StoreResult<StatsSnapshot> {
    let total = store.count_all().await?;
    let safe_count = store.count_by_status(ScanStatus::Safe).await?;
    let malicious_count = store.count_by_status(ScanStatus::Malicious).await?;

    Ok(StatsSnapshot {
        total,
        safe_count,
        malicious_count,
    })
}
